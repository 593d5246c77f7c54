use std::fmt;
use std::str::FromStr;

/// The fixed set of accepted gender values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    PreferNotToSay,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 5] = [
        Gender::Female,
        Gender::Male,
        Gender::NonBinary,
        Gender::PreferNotToSay,
        Gender::Other,
    ];

    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::NonBinary => "non-binary",
            Gender::PreferNotToSay => "prefer-not-to-say",
            Gender::Other => "other",
        }
    }

    /// Comma-separated list of accepted values, for error messages.
    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the accepted gender values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGender(pub String);

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownGender(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_member() {
        for g in Gender::ALL {
            assert_eq!(g.as_str().parse::<Gender>().unwrap(), g);
        }
    }

    #[test]
    fn rejects_unknown_and_wrong_case() {
        assert_eq!(
            "martian".parse::<Gender>(),
            Err(UnknownGender("martian".into()))
        );
        assert!("Female".parse::<Gender>().is_err());
        assert!("non_binary".parse::<Gender>().is_err());
    }

    #[test]
    fn allowed_lists_all_values() {
        assert_eq!(
            Gender::allowed(),
            "female, male, non-binary, prefer-not-to-say, other"
        );
    }
}
