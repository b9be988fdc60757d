//! Text form `"<len>  c0 c1 ..."` and a human-readable rendering.

use std::fmt;
use std::str::FromStr;

use zpoly_mpn::ErrorKind;

use crate::integer::ZInt;
use crate::poly::IntPoly;

impl fmt::Display for IntPoly {
    /// The zero polynomial prints as `"0 "`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0 ");
        }
        write!(f, "{} ", self.len())?;
        for i in 0..self.len() {
            write!(f, " {}", self.get_coeff(i))?;
        }
        Ok(())
    }
}

impl FromStr for IntPoly {
    type Err = ErrorKind;

    /// Parses the [`fmt::Display`] form with any whitespace between fields.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut toks = s.split_whitespace();
        let head = toks
            .next()
            .ok_or_else(|| ErrorKind::InvalidText("missing length".to_string()))?;
        let len: usize = head
            .parse()
            .map_err(|_| ErrorKind::InvalidText(format!("bad length {head:?}")))?;
        let mut coeffs = Vec::new();
        coeffs.try_reserve(len.min(s.len()))?;
        for i in 0..len {
            let tok = toks
                .next()
                .ok_or_else(|| ErrorKind::InvalidText(format!("missing coefficient {i}")))?;
            coeffs.push(tok.parse::<ZInt>()?);
        }
        if let Some(extra) = toks.next() {
            return Err(ErrorKind::InvalidText(format!("trailing input {extra:?}")));
        }
        IntPoly::from_zints(&coeffs)
    }
}

impl IntPoly {
    /// Render as `42*x^5+37*x^3-5*x+7` in the variable `var`.
    #[must_use]
    pub fn pretty(&self, var: &str) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut out = String::new();
        for i in (0..self.len()).rev() {
            let c = self.get_coeff(i);
            if c.is_zero() {
                continue;
            }
            let sign = if c.is_negative() { "-" } else if out.is_empty() { "" } else { "+" };
            let mag = c.abs();
            let body = match (i, mag.is_one()) {
                (0, _) => mag.to_string(),
                (1, true) => var.to_string(),
                (1, false) => format!("{mag}*{var}"),
                (_, true) => format!("{var}^{i}"),
                (_, false) => format!("{mag}*{var}^{i}"),
            };
            out.push_str(sign);
            out.push_str(&body);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(c: &[i64]) -> IntPoly {
        IntPoly::from_i64s(c).unwrap()
    }

    #[test]
    fn display_form() {
        assert_eq!(p(&[1, 0, -3]).to_string(), "3  1 0 -3");
        assert_eq!(IntPoly::new().to_string(), "0 ");
    }

    #[test]
    fn parse_round_trip() {
        let f: IntPoly = "2  -340282366920938463463374607431768211457 18".parse().unwrap();
        assert_eq!(f.to_string().parse::<IntPoly>().unwrap(), f);
        assert_eq!(f.get_coeff(1), ZInt::from(18i64));
        let g: IntPoly = " 3\n 5   0\t0 ".parse().unwrap();
        assert_eq!(g, p(&[5]));
        assert!("0".parse::<IntPoly>().unwrap().is_zero());
        assert!(IntPoly::new().to_string().parse::<IntPoly>().unwrap().is_zero());
    }

    #[test]
    fn parse_errors() {
        assert!(matches!("".parse::<IntPoly>(), Err(ErrorKind::InvalidText(_))));
        assert!(matches!("2  1".parse::<IntPoly>(), Err(ErrorKind::InvalidText(_))));
        assert!(matches!("1  1 2".parse::<IntPoly>(), Err(ErrorKind::InvalidText(_))));
        assert!(matches!("1  1.5".parse::<IntPoly>(), Err(ErrorKind::InvalidText(_))));
        assert!(matches!("-1".parse::<IntPoly>(), Err(ErrorKind::InvalidText(_))));
    }

    #[test]
    fn pretty_printing() {
        assert_eq!(p(&[7, -5, 0, 37, 0, 42]).pretty("x"), "42*x^5+37*x^3-5*x+7");
        assert_eq!(p(&[0, 1, -1]).pretty("t"), "-t^2+t");
        assert_eq!(p(&[-1]).pretty("x"), "-1");
        assert_eq!(IntPoly::new().pretty("x"), "0");
    }
}
