use std::fmt;

use serde::{Deserialize, Serialize};

/// Multiplicity of a relationship, read from the FK owner towards its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    #[default]
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// Every cardinality, in declaration order.
    pub const ALL: [Cardinality; 4] = [
        Self::OneToOne,
        Self::OneToMany,
        Self::ManyToOne,
        Self::ManyToMany,
    ];

    /// The relationship symbol emitted in diagram text.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::OneToOne => "||--||",
            Self::OneToMany => "||--o{",
            Self::ManyToOne => "}o--||",
            Self::ManyToMany => "}o--o{",
        }
    }

    /// Reads a relationship symbol.
    ///
    /// Besides the four emitted symbols this accepts the wider erDiagram
    /// family: `||`/`|o` on the left and `||`/`o|` on the right mean one,
    /// `}o`/`}|` on the left and `o{`/`|{` on the right mean many, and the
    /// connector may be `--` or `..`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if symbol.len() != 6 || !symbol.is_ascii() {
            return None;
        }
        let (left, rest) = symbol.split_at(2);
        let (connector, right) = rest.split_at(2);
        if connector != "--" && connector != ".." {
            return None;
        }

        let left_many = match left {
            "||" | "|o" => false,
            "}o" | "}|" => true,
            _ => return None,
        };
        let right_many = match right {
            "||" | "o|" => false,
            "o{" | "|{" => true,
            _ => return None,
        };

        Some(match (left_many, right_many) {
            (false, false) => Self::OneToOne,
            (false, true) => Self::OneToMany,
            (true, false) => Self::ManyToOne,
            (true, true) => Self::ManyToMany,
        })
    }

    /// Kebab-case label, e.g. `many-to-one`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToOne => "many-to-one",
            Self::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
