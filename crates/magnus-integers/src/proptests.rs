//! Property-based tests for normalization and rounding.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{
        normalize, round, round_quotient, scaled_division, Integer, RoundingMode, ScaledDecimal,
    };

    // Strategy for generating small integers
    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    // Strategy for generating non-zero integers
    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
    }

    // Decimal integer text, possibly signed, with leading zeros and long runs
    fn integer_text() -> impl Strategy<Value = String> {
        "[+-]?[0-9]{1,60}"
    }

    fn any_mode() -> impl Strategy<Value = RoundingMode> {
        prop::sample::select(RoundingMode::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn normalize_round_trips(text in integer_text()) {
            let once = normalize(text.as_str()).unwrap();
            let twice = normalize(once.to_string()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalize_agrees_with_machine_integers(n in any::<i64>()) {
            prop_assert_eq!(normalize(n.to_string()).unwrap(), Integer::new(n));
            prop_assert_eq!(normalize(n).unwrap(), Integer::new(n));
        }

        #[test]
        fn integer_add_commutative(a in small_int(), b in small_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            prop_assert_eq!(a.clone() + b.clone(), b.clone() + a.clone());
        }

        #[test]
        fn integer_distributive(a in small_int(), b in small_int(), c in small_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let c = Integer::new(c);
            prop_assert_eq!(
                a.clone() * (b.clone() + c.clone()),
                a.clone() * b.clone() + a.clone() * c.clone()
            );
        }

        #[test]
        fn floor_and_ceil_bracket_the_quotient(n in small_int(), d in non_zero_int()) {
            let n = Integer::new(n);
            let d = Integer::new(d);
            let lo = round_quotient(&n, &d, RoundingMode::Floor).unwrap();
            let hi = round_quotient(&n, &d, RoundingMode::Ceil).unwrap();
            // lo <= n/d <= hi, with sign-correct cross multiplication
            let sign = Integer::new(i64::from(d.signum()));
            prop_assert!(&(&lo * &d) * &sign <= &n * &sign);
            prop_assert!(&(&hi * &d) * &sign >= &n * &sign);
            prop_assert!(&hi - &lo <= Integer::new(1));
        }

        #[test]
        fn nearest_modes_stay_within_half_a_unit(
            n in small_int(),
            d in non_zero_int(),
            mode in prop::sample::select(vec![
                RoundingMode::HalfEven,
                RoundingMode::HalfUp,
                RoundingMode::HalfDown,
            ]),
        ) {
            let n = Integer::new(n);
            let d = Integer::new(d);
            let q = round_quotient(&n, &d, mode).unwrap();
            // |q*d - n| * 2 <= |d|
            let error = (&q * &d - n).abs() * Integer::new(2);
            prop_assert!(error <= d.abs());
        }

        #[test]
        fn raising_precision_is_exact(
            unscaled in small_int(),
            scale in 0u32..6,
            extra in 0u32..6,
            mode in any_mode(),
        ) {
            let value = ScaledDecimal::new(Integer::new(unscaled), scale);
            let widened = round(&value, scale + extra, mode).unwrap();
            prop_assert_eq!(widened, value);
        }

        #[test]
        fn scaled_division_matches_rounding_a_quotient(
            n in small_int(),
            d in non_zero_int(),
            precision in 0u32..8,
            mode in any_mode(),
        ) {
            let n = Integer::new(n);
            let d = Integer::new(d);
            let direct = scaled_division(&n, &d, precision, mode).unwrap();
            let down = scaled_division(&n, &d, precision, RoundingMode::Down).unwrap();
            let scaled = &n * &Integer::ten_pow(precision as usize);
            prop_assert_eq!(direct.scale(), precision);
            prop_assert_eq!(
                direct.unscaled(),
                &round_quotient(&scaled, &d, mode).unwrap()
            );

            let step = (direct.unscaled() - down.unscaled()).abs();
            prop_assert!(step <= Integer::new(1));

            // Signed distance of the rounded value from the exact quotient,
            // scaled by |d|.
            let sign = Integer::new(i64::from(d.signum()));
            let offset = &(&(direct.unscaled() * &d) - &scaled) * &sign;
            let terminates = &(down.unscaled() * &d) == &scaled;
            if terminates {
                prop_assert_eq!(&direct, &down);
            } else {
                match mode {
                    RoundingMode::Floor => prop_assert!(offset < Integer::new(0)),
                    RoundingMode::Ceil => prop_assert!(offset > Integer::new(0)),
                    RoundingMode::Down => prop_assert_eq!(&direct, &down),
                    RoundingMode::Up => {
                        prop_assert!(direct.unscaled().abs() > down.unscaled().abs());
                    }
                    RoundingMode::HalfEven | RoundingMode::HalfUp | RoundingMode::HalfDown => {
                        prop_assert!(offset.abs() * Integer::new(2) <= d.abs());
                    }
                }
            }
        }
    }
}
