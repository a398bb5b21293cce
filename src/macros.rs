/// Создаёт новый доменный тип с проверкой значения при создании и десериализации.
#[macro_export]
macro_rules! newtype {
    ($tname:ident, String, "String", $validate_fn:ident) => {
        #[derive(
            std::fmt::Debug,
            std::clone::Clone,
            serde::Serialize,
            serde::Deserialize,
            std::cmp::PartialEq,
            std::cmp::Eq,
        )]
        #[serde(try_from = "String")]
        pub struct $tname(String);

        impl $tname {
            pub fn new(value: &str) -> anyhow::Result<Self> {
                Self::validate(value)?;
                Ok(Self(value.into()))
            }

            pub fn get(&self) -> &str {
                &self.0
            }

            fn validate(value: &str) -> anyhow::Result<()> {
                $validate_fn(value)
            }
        }

        impl std::fmt::Display for $tname {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::convert::TryFrom<String> for $tname {
            type Error = anyhow::Error;

            fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
                $tname::new(&value)
            }
        }
    };

    ($tname:ident, $type:ty, $try_from:literal, $validate_fn:ident) => {
        #[derive(
            std::fmt::Debug,
            std::clone::Clone,
            std::marker::Copy,
            serde::Serialize,
            serde::Deserialize,
            std::cmp::PartialEq,
            std::cmp::Eq,
            std::default::Default,
        )]
        #[serde(try_from = $try_from)]
        pub struct $tname($type);

        impl $tname {
            pub fn new(value: $type) -> anyhow::Result<Self> {
                Self::validate(&value)?;
                Ok(Self(value))
            }

            pub fn get(&self) -> $type {
                self.0
            }

            fn validate(value: &$type) -> anyhow::Result<()> {
                $validate_fn(value)
            }
        }

        impl std::convert::TryFrom<$type> for $tname {
            type Error = anyhow::Error;

            fn try_from(value: $type) -> std::result::Result<Self, Self::Error> {
                $tname::new(value)
            }
        }
    };
}
