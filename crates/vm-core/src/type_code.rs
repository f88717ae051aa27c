use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Étiquette catégorielle à 4 symboles.
///
/// Le classifieur standard produit `{H|L}{F|S}{E|C}{C|D}` ou l'un des deux
/// cas spéciaux [`TypeCode::ROBOT`] et [`TypeCode::WHALE`]. Ces derniers
/// s'écrivent avec les mêmes lettres qu'un code standard : le code seul ne
/// dit pas quelle règle l'a produit.
///
/// # Example
/// ```
/// use vm_core::type_code::TypeCode;
/// let code: TypeCode = "HFEC".parse().unwrap();
/// assert_eq!(code.as_str(), "HFEC");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeCode([u8; 4]);

impl TypeCode {
    /// "Flat affect / mechanical": high pitch with almost no energy variation.
    pub const ROBOT: Self = Self(*b"HFCC");
    /// "Deep / minimal variation": very low pitch, calm energy.
    pub const WHALE: Self = Self(*b"LSCD");

    /// Builds a code from four ASCII letters.
    #[must_use]
    pub const fn from_symbols(symbols: [u8; 4]) -> Self {
        Self(symbols)
    }

    /// Assembles a standard code from the four axis decisions.
    ///
    /// # Example
    /// ```
    /// use vm_core::type_code::TypeCode;
    /// let code = TypeCode::standard(false, false, true, false);
    /// assert_eq!(code.as_str(), "LSED");
    /// ```
    #[must_use]
    pub const fn standard(high_pitch: bool, fast: bool, energetic: bool, clear: bool) -> Self {
        Self([
            if high_pitch { b'H' } else { b'L' },
            if fast { b'F' } else { b'S' },
            if energetic { b'E' } else { b'C' },
            if clear { b'C' } else { b'D' },
        ])
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// The four symbols.
    #[must_use]
    pub const fn symbols(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(CoreError::InvalidTypeCode { code: s.to_string() });
        }
        Ok(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl TryFrom<String> for TypeCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeCode> for String {
    fn from(code: TypeCode) -> Self {
        code.as_str().to_string()
    }
}
