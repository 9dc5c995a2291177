//! Property-based tests for the kernel.

#[cfg(test)]
mod tests {
    use magnus_integers::Integer;
    use proptest::prelude::*;

    use crate::{
        add, bit_and, bit_not, bit_or, divide, isqrt, modulo, multiply, power, subtract,
        tetration, BitPolicy, Combinatorics, Config,
    };

    fn cfg() -> Config {
        Config::default()
    }

    fn big_text() -> impl Strategy<Value = String> {
        "-?[1-9][0-9]{0,40}"
    }

    proptest! {
        #[test]
        fn add_then_subtract_restores(a in big_text(), b in big_text()) {
            let sum = add(a.as_str(), b.as_str(), &cfg()).unwrap();
            let back = subtract(&sum, b.as_str(), &cfg()).unwrap();
            prop_assert_eq!(back, Integer::parse(&a).unwrap());
        }

        #[test]
        fn division_identity(a in big_text(), b in big_text()) {
            let q = divide(a.as_str(), b.as_str(), &cfg()).unwrap();
            let r = modulo(a.as_str(), b.as_str(), &cfg()).unwrap();
            let rebuilt = add(multiply(&q, b.as_str(), &cfg()).unwrap(), &r, &cfg()).unwrap();
            prop_assert_eq!(rebuilt, Integer::parse(&a).unwrap());
            prop_assert!(r.cmp_abs(&Integer::parse(&b).unwrap()).is_lt());
        }

        #[test]
        fn bitwise_matches_machine_words(a in any::<i32>(), b in any::<i32>()) {
            let config = cfg().with_max_bits(64);
            prop_assert_eq!(
                bit_and(a, b, BitPolicy::Strict, &config).unwrap(),
                Integer::new(i64::from(a & b))
            );
            prop_assert_eq!(
                bit_or(a, b, BitPolicy::Strict, &config).unwrap(),
                Integer::new(i64::from(a | b))
            );
            prop_assert_eq!(
                bit_not(a, BitPolicy::Strict, &config).unwrap(),
                Integer::new(i64::from(!a))
            );
        }

        #[test]
        fn isqrt_brackets_the_root(n in 0u64..u64::MAX) {
            let r = isqrt(n, &cfg()).unwrap();
            let next = &r + &Integer::new(1);
            prop_assert!(&r * &r <= Integer::from(n));
            prop_assert!(&next * &next > Integer::from(n));
        }

        #[test]
        fn power_adds_exponents(base in -20i64..20, e1 in 0u32..30, e2 in 0u32..30) {
            let lhs = power(base, e1 + e2, &cfg()).unwrap();
            let rhs = multiply(
                power(base, e1, &cfg()).unwrap(),
                power(base, e2, &cfg()).unwrap(),
                &cfg(),
            )
            .unwrap();
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn tetration_low_heights(base in -50i64..50) {
            prop_assert_eq!(tetration(base, 0, &cfg()).unwrap(), Integer::new(1));
            prop_assert_eq!(tetration(base, 1, &cfg()).unwrap(), Integer::new(base));
        }

        #[test]
        fn binomial_symmetry(n in 0u64..120, k in 0u64..120) {
            prop_assume!(k <= n);
            let c = Combinatorics::default();
            prop_assert_eq!(c.binomial(n, k).unwrap(), c.binomial(n, n - k).unwrap());
        }

        #[test]
        fn binomial_pascal_rule(n in 1u64..100, k in 1u64..100) {
            prop_assume!(k <= n);
            let c = Combinatorics::default();
            let sum = c.binomial(n - 1, k - 1).unwrap() + c.binomial(n - 1, k).unwrap();
            prop_assert_eq!(c.binomial(n, k).unwrap(), sum);
        }

        #[test]
        fn factorial_recurrence(n in 1u64..200) {
            let mut c = Combinatorics::default();
            let prev = c.factorial(n - 1).unwrap();
            prop_assert_eq!(c.factorial(n).unwrap(), Integer::from(n) * prev);
        }

        #[test]
        fn cached_and_uncached_factorials_agree(ns in prop::collection::vec(0u64..150, 1..20)) {
            let mut cached = Combinatorics::default().with_cache();
            let mut plain = Combinatorics::default();
            for n in ns {
                prop_assert_eq!(cached.factorial(n).unwrap(), plain.factorial(n).unwrap());
            }
        }
    }
}
