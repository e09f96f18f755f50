#[derive(Clone, Debug)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(format!("invalid mode: {}", s)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mode::Development => "development",
            Mode::Production => "production",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mode_parse_aliases() {
        assert!(Mode::from_str("dev").is_ok_and(|m| !m.is_production()));
        assert!(Mode::from_str("PROD").is_ok_and(|m| m.is_production()));
    }

    #[test]
    fn test_mode_parse_unknown() {
        assert!(Mode::from_str("staging").is_err());
    }
}
