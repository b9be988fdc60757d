//! Text form `"<len> <p>  c0 c1 ..."` and a human-readable rendering.

use std::fmt;
use std::str::FromStr;

use zpoly_mpn::ErrorKind;

use crate::poly::ModPoly;

impl fmt::Display for ModPoly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.len(), self.modulus())?;
        if !self.is_zero() {
            write!(f, " ")?;
            for c in self.coeffs() {
                write!(f, " {c}")?;
            }
        }
        Ok(())
    }
}

fn parse_word(tok: Option<&str>, what: &str) -> Result<u64, ErrorKind> {
    let tok = tok.ok_or_else(|| ErrorKind::InvalidText(format!("missing {what}")))?;
    tok.parse()
        .map_err(|_| ErrorKind::InvalidText(format!("bad {what} {tok:?}")))
}

impl FromStr for ModPoly {
    type Err = ErrorKind;

    /// Parses the [`fmt::Display`] form. Any amount of whitespace separates
    /// the fields; coefficients are reduced modulo `p`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut toks = s.split_whitespace();
        let len = usize::try_from(parse_word(toks.next(), "length")?)
            .map_err(|_| ErrorKind::LengthOverflow)?;
        let p = parse_word(toks.next(), "modulus")?;
        let mut coeffs = Vec::new();
        coeffs.try_reserve(len.min(s.len()))?;
        for i in 0..len {
            coeffs.push(parse_word(toks.next(), &format!("coefficient {i}"))?);
        }
        if let Some(extra) = toks.next() {
            return Err(ErrorKind::InvalidText(format!("trailing input {extra:?}")));
        }
        ModPoly::from_coeffs(p, &coeffs)
    }
}

impl ModPoly {
    /// Render as `5*x^3+x+2` in the variable `var`, highest degree first.
    #[must_use]
    pub fn pretty(&self, var: &str) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut terms = Vec::new();
        for (i, &c) in self.coeffs().iter().enumerate().rev() {
            if c == 0 {
                continue;
            }
            let term = match (i, c) {
                (0, _) => c.to_string(),
                (1, 1) => var.to_string(),
                (1, _) => format!("{c}*{var}"),
                (_, 1) => format!("{var}^{i}"),
                _ => format!("{c}*{var}^{i}"),
            };
            terms.push(term);
        }
        terms.join("+")
    }
}
