//! Tonelli-Shanks modular square root.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Returns `r` such that `r * r mod p == a`, or `None` if `a` is a quadratic
/// non-residue modulo the odd prime `p`.
pub fn tonelli_shanks(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.is_zero() {
        return Some(BigUint::zero());
    }
    if !is_quadratic_residue(&a, p) {
        return None;
    }

    let one = BigUint::one();
    let two = &one + &one;

    // p mod 4 == 3 fast path: r = a^((p+1)/4) mod p.
    let four = &two + &two;
    if p.mod_floor(&four) == BigUint::from(3u8) {
        let exp = (p + &one) / &four;
        return Some(a.modpow(&exp, p));
    }

    // General case: factor p - 1 = q * 2^s with q odd.
    let p_minus_one = p - &one;
    let mut q = p_minus_one.clone();
    let mut s = 0u32;
    while q.is_even() {
        q /= &two;
        s += 1;
    }

    // Find a quadratic non-residue z.
    let mut z = two.clone();
    while is_quadratic_residue(&z, p) {
        z += &one;
    }

    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = a.modpow(&q, p);
    let mut r = a.modpow(&((&q + &one) / &two), p);

    loop {
        if t == one {
            return Some(r);
        }
        let mut i = 0u32;
        let mut t2i = t.clone();
        while t2i != one {
            t2i = (&t2i * &t2i) % p;
            i += 1;
            if i >= m {
                // a was not actually a residue; should not happen given the check above.
                return None;
            }
        }
        let b_exp = BigUint::from(1u32) << (m - i - 1);
        let b = c.modpow(&b_exp, p);
        m = i;
        c = (&b * &b) % p;
        t = (&t * &c) % p;
        r = (&r * &b) % p;
    }
}

fn is_quadratic_residue(a: &BigUint, p: &BigUint) -> bool {
    if a.is_zero() {
        return true;
    }
    let one = BigUint::one();
    let exp = (p - &one) / (&one + &one);
    a.modpow(&exp, p) == one
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn finds_square_root_mod_p_equiv_3_mod_4() {
        // p = 23 ≡ 3 mod 4. 4 is a QR (2^2), root should be 2 or 21.
        let p = BigUint::from_u32(23).unwrap();
        let a = BigUint::from_u32(4).unwrap();
        let r = tonelli_shanks(&a, &p).expect("4 is a QR mod 23");
        assert_eq!((&r * &r) % &p, a);
    }

    #[test]
    fn finds_square_root_mod_p_equiv_1_mod_4() {
        // p = 17 ≡ 1 mod 4. 9 = 3^2 is a QR.
        let p = BigUint::from_u32(17).unwrap();
        let a = BigUint::from_u32(9).unwrap();
        let r = tonelli_shanks(&a, &p).expect("9 is a QR mod 17");
        assert_eq!((&r * &r) % &p, a);
    }

    #[test]
    fn non_residue_returns_none() {
        // p = 23, quadratic residues are {1,2,3,4,6,8,9,12,13,16,18}; 5 is not one.
        let p = BigUint::from_u32(23).unwrap();
        let a = BigUint::from_u32(5).unwrap();
        assert_eq!(tonelli_shanks(&a, &p), None);
    }
}
