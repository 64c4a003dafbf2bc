// Rolodex
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Utilities to deal with environment variables.

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

/// Result type for environment errors.
type Result<T> = std::result::Result<T, String>;

/// Wrapper around an environment variable's value to support conversions to other types.
pub struct Value(String);

impl TryFrom<Value> for String {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        Ok(value.0)
    }
}

impl TryFrom<Value> for PathBuf {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        if value.0.is_empty() {
            return Err("Path cannot be empty".to_owned());
        }
        Ok(PathBuf::from(value.0))
    }
}

/// Generates a `TryFrom<Value>` for a type that can be parsed by `FromStr`.
macro_rules! tryfrom_value_for_fromstr [
    ( $t:ty ) => {
        impl TryFrom<Value> for $t {
            type Error = String;

            fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
                value.0.parse::<$t>().map_err(|e| format!("Invalid {}: {}", stringify!($t), e))
            }
        }
    }
];

tryfrom_value_for_fromstr!(i8);
tryfrom_value_for_fromstr!(i16);
tryfrom_value_for_fromstr!(i32);
tryfrom_value_for_fromstr!(i64);
tryfrom_value_for_fromstr!(i128);
tryfrom_value_for_fromstr!(u8);
tryfrom_value_for_fromstr!(u16);
tryfrom_value_for_fromstr!(u32);
tryfrom_value_for_fromstr!(u64);
tryfrom_value_for_fromstr!(u128);
tryfrom_value_for_fromstr!(usize);
tryfrom_value_for_fromstr!(IpAddr);

/// Gets an optional environment variable whose name is `<prefix>_<suffix>` with a conversion to
/// a target type `T`.  Returns `None` if the variable is not present.
pub fn get_optional_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<Option<T>> {
    let name = format!("{}_{}", prefix, suffix);
    match env::var(&name) {
        Ok(value) => match Value(value).try_into() {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(format!("Invalid type in environment variable {}: {}", name, e)),
        },
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            Err(format!("Invalid value in environment variable {}", name))
        }
    }
}

/// Gets a required environment variable whose name is `<prefix>_<suffix>` with a conversion to
/// a target type `T`.
pub fn get_required_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<T> {
    match get_optional_var(prefix, suffix)? {
        Some(value) => Ok(value),
        None => Err(format!("Required environment variable {}_{} not present", prefix, suffix)),
    }
}

/// Deployment mode of the service, which selects defaults and how much detail to show on errors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Environment {
    /// Local development.  Error pages include diagnostic details.
    #[default]
    Development,

    /// Public deployment.  Error pages are generic.
    Production,
}

impl Environment {
    /// Reads the deployment mode from the `<prefix>_ENV` variable, defaulting to development.
    pub fn from_env(prefix: &str) -> Result<Self> {
        match get_optional_var::<String>(prefix, "ENV")?.as_deref() {
            None | Some("") | Some("development") => Ok(Self::Development),
            Some("production") => Ok(Self::Production),
            Some(other) => Err(format!(
                "Invalid value in environment variable {}_ENV: unknown environment {}",
                prefix, other
            )),
        }
    }

    /// Returns true if this is the production environment.
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    /// Returns the prefix of the variables that configure the database for this environment.
    pub fn db_prefix(self) -> &'static str {
        match self {
            Self::Development => "PGSQL_DEV",
            Self::Production => "PGSQL_PROD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    #[test]
    fn test_value_to_string() {
        assert_eq!("foo bar", &TryInto::<String>::try_into(Value("foo bar".to_owned())).unwrap());
    }

    #[test]
    fn test_value_to_fromstr() {
        assert_eq!(1234u16, TryInto::<u16>::try_into(Value("1234".to_owned())).unwrap());

        let err = TryInto::<u16>::try_into(Value("-1".to_owned())).unwrap_err();
        assert!(err.starts_with("Invalid u16:"));
    }

    #[test]
    fn test_value_to_ipaddr() {
        let addr: IpAddr = Value("127.0.0.1".to_owned()).try_into().unwrap();
        assert!(addr.is_loopback());

        let err = TryInto::<IpAddr>::try_into(Value("localhost".to_owned())).unwrap_err();
        assert!(err.starts_with("Invalid IpAddr:"));
    }

    #[test]
    fn test_value_to_pathbuf() {
        let path: PathBuf = Value("/tmp/foo".to_owned()).try_into().unwrap();
        assert_eq!(PathBuf::from("/tmp/foo"), path);

        assert_eq!(
            "Path cannot be empty",
            TryInto::<PathBuf>::try_into(Value(String::new())).unwrap_err()
        );
    }

    #[test]
    fn test_get_optional_var_present() {
        temp_env::with_var("PREFIX_OPT_PRESENT", Some("5"), || {
            assert_eq!(Some(5u8), get_optional_var::<u8>("PREFIX", "OPT_PRESENT").unwrap());
        });
    }

    #[test]
    fn test_get_optional_var_missing() {
        temp_env::with_var_unset("PREFIX_OPT_MISSING", || {
            assert_eq!(None, get_optional_var::<u8>("PREFIX", "OPT_MISSING").unwrap());
        });
    }

    #[test]
    fn test_get_optional_var_bad_type() {
        temp_env::with_var("PREFIX_OPT_BAD", Some("x"), || {
            let err = get_optional_var::<u8>("PREFIX", "OPT_BAD").unwrap_err();
            assert!(err.starts_with("Invalid type in environment variable PREFIX_OPT_BAD"));
        });
    }

    #[test]
    fn test_get_required_var_ok() {
        temp_env::with_var("PREFIX_PRESENT", Some("1234"), || {
            assert_eq!("1234", &get_required_var::<String>("PREFIX", "PRESENT").unwrap());
        });
    }

    #[test]
    fn test_get_required_var_missing() {
        temp_env::with_var_unset("PREFIX_MISSING", || {
            assert_eq!(
                "Required environment variable PREFIX_MISSING not present",
                &get_required_var::<String>("PREFIX", "MISSING").unwrap_err()
            );
        });
    }

    #[test]
    fn test_get_required_var_not_utf8() {
        temp_env::with_var("PREFIX_INVALID", Some(OsStr::from_bytes(b"\xc3\x28")), || {
            assert_eq!(
                "Invalid value in environment variable PREFIX_INVALID",
                &get_required_var::<String>("PREFIX", "INVALID").unwrap_err()
            );
        });
    }

    #[test]
    fn test_get_required_var_bad_type() {
        temp_env::with_var("PREFIX_BAD", Some("b4d"), || {
            let err = get_required_var::<u16>("PREFIX", "BAD").unwrap_err();
            assert!(
                err.starts_with("Invalid type in environment variable PREFIX_BAD: Invalid u16")
            );
        });
    }

    #[test]
    fn test_environment_from_env() {
        temp_env::with_var_unset("ENVTEST1_ENV", || {
            assert_eq!(Environment::Development, Environment::from_env("ENVTEST1").unwrap());
        });
        temp_env::with_var("ENVTEST2_ENV", Some("development"), || {
            assert_eq!(Environment::Development, Environment::from_env("ENVTEST2").unwrap());
        });
        temp_env::with_var("ENVTEST3_ENV", Some("production"), || {
            let env = Environment::from_env("ENVTEST3").unwrap();
            assert!(env.is_production());
            assert_eq!("PGSQL_PROD", env.db_prefix());
        });
        temp_env::with_var("ENVTEST4_ENV", Some("staging"), || {
            let err = Environment::from_env("ENVTEST4").unwrap_err();
            assert!(err.contains("unknown environment staging"));
        });
    }

    #[test]
    fn test_environment_db_prefix() {
        assert_eq!("PGSQL_DEV", Environment::Development.db_prefix());
        assert!(!Environment::Development.is_production());
    }
}
