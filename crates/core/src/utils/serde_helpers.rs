//! Serde utility helpers for case-insensitive deserialization

/// Macro to implement case-insensitive deserialization for fieldless enums
///
/// Usage:
/// ```ignore
/// impl_case_insensitive_deserialize!(
///     Ascent,
///     Single => "single",
///     Double => "double"
/// );
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, $($variant:ident => $str_val:expr),+ $(,)?) => {
        impl<'de> serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                match s.to_lowercase().as_str() {
                    $(
                        $str_val => Ok(Self::$variant),
                    )+
                    _ => Err(serde::de::Error::custom(format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        [$($str_val),+].join(", ")
                    ))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Mode {
        Watch,
        Once,
    }

    impl_case_insensitive_deserialize!(
        Mode,
        Watch => "watch",
        Once => "once"
    );

    #[test]
    fn test_case_insensitive_deserialize() {
        let result: Mode = serde_json::from_str(r#""watch""#).unwrap();
        assert_eq!(result, Mode::Watch);

        let result: Mode = serde_json::from_str(r#""ONCE""#).unwrap();
        assert_eq!(result, Mode::Once);

        let result: Result<Mode, _> = serde_json::from_str(r#""sometimes""#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown variant 'sometimes'"));
        assert!(err.contains("expected one of: watch, once"));
    }
}
