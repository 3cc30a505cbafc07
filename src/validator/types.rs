use thiserror::Error;

/// Why a raw string could not be split into local part and domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("no @ separator")]
    NoSeparator,
    #[error("multiple @ separators ({0})")]
    MultipleSeparators(usize),
    #[error("empty local part")]
    EmptyLocal,
    #[error("empty domain")]
    EmptyDomain,
}

/// An address split on its last `@`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    raw: String,
    local_part: String,
    domain: String,
}

impl EmailAddress {
    /// Structural split only: exactly one `@` with non-empty sides.
    pub fn parse(raw: &str) -> Result<Self, StructureError> {
        let separators = raw.matches('@').count();
        let (local, domain) = match separators {
            0 => return Err(StructureError::NoSeparator),
            1 => raw.rsplit_once('@').ok_or(StructureError::NoSeparator)?,
            n => return Err(StructureError::MultipleSeparators(n)),
        };
        if local.is_empty() {
            return Err(StructureError::EmptyLocal);
        }
        if domain.is_empty() {
            return Err(StructureError::EmptyDomain);
        }
        Ok(Self {
            raw: raw.to_string(),
            local_part: local.to_string(),
            domain: domain.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
