//! Registry access.
//!
//! On Windows this is `winreg`; elsewhere every call fails with
//! [`SysError::Unsupported`] so nothing can be mutated by accident.

#[cfg(windows)]
pub use self::windows::WinRegistry as PlatformRegistry;

#[cfg(not(windows))]
pub use self::unsupported::UnsupportedRegistry as PlatformRegistry;

#[cfg(windows)]
mod windows {
    use std::io;

    use hush_core::{ChangeSet, Hive, RegValue};
    use winreg::RegKey;
    use winreg::enums::{
        HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE, RegDisposition,
    };

    use crate::error::SysError;
    use crate::ports::RegistryPort;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct WinRegistry;

    fn root(hive: Hive) -> RegKey {
        RegKey::predef(match hive {
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
            Hive::CurrentUser => HKEY_CURRENT_USER,
        })
    }

    fn map_io(error: io::Error, hive: Hive, path: &str) -> SysError {
        match error.kind() {
            io::ErrorKind::NotFound => SysError::not_found("registry key", format!("{hive}\\{path}")),
            io::ErrorKind::PermissionDenied => {
                SysError::AccessDenied(format!("{hive}\\{path}: {error}"))
            }
            _ => SysError::Io(error),
        }
    }

    fn open(hive: Hive, path: &str, flags: u32) -> Result<Option<RegKey>, SysError> {
        match root(hive).open_subkey_with_flags(path, flags) {
            Ok(key) => Ok(Some(key)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(map_io(error, hive, path)),
        }
    }

    impl RegistryPort for WinRegistry {
        fn key_exists(&self, hive: Hive, path: &str) -> Result<bool, SysError> {
            Ok(open(hive, path, KEY_READ)?.is_some())
        }

        fn create_key(&self, hive: Hive, path: &str) -> Result<bool, SysError> {
            let (_, disposition) = root(hive)
                .create_subkey_with_flags(path, KEY_WRITE)
                .map_err(|e| map_io(e, hive, path))?;
            Ok(matches!(disposition, RegDisposition::REG_CREATED_NEW_KEY))
        }

        fn set_values(&self, change_set: &ChangeSet) -> Result<(), SysError> {
            let (hive, path) = (change_set.hive(), change_set.path());
            let (key, _) = root(hive)
                .create_subkey_with_flags(path, KEY_WRITE)
                .map_err(|e| map_io(e, hive, path))?;

            for (name, value) in change_set.values() {
                let written = match value {
                    RegValue::Dword(v) => key.set_value(name, v),
                    RegValue::String(s) => key.set_value(name, s),
                };
                written.map_err(|e| map_io(e, hive, path))?;
            }
            Ok(())
        }

        fn read_value(
            &self,
            hive: Hive,
            path: &str,
            name: &str,
        ) -> Result<Option<RegValue>, SysError> {
            let Some(key) = open(hive, path, KEY_READ)? else {
                return Ok(None);
            };

            match key.get_value::<u32, _>(name) {
                Ok(value) => return Ok(Some(RegValue::Dword(value))),
                Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
                // Wrong type for a DWORD read; try it as a string below.
                Err(_) => {}
            }
            match key.get_value::<String, _>(name) {
                Ok(value) => Ok(Some(RegValue::String(value))),
                Err(error) => Err(map_io(error, hive, path)),
            }
        }

        fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), SysError> {
            let Some(key) = open(hive, path, KEY_WRITE)? else {
                return Ok(());
            };
            match key.delete_value(name) {
                Err(error) if error.kind() != io::ErrorKind::NotFound => {
                    Err(map_io(error, hive, path))
                }
                _ => Ok(()),
            }
        }
    }
}

#[cfg(not(windows))]
mod unsupported {
    use hush_core::{ChangeSet, Hive, RegValue};

    use crate::error::SysError;
    use crate::ports::RegistryPort;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct UnsupportedRegistry;

    fn unsupported() -> SysError {
        SysError::Unsupported("registry access requires Windows".to_string())
    }

    impl RegistryPort for UnsupportedRegistry {
        fn key_exists(&self, _hive: Hive, _path: &str) -> Result<bool, SysError> {
            Err(unsupported())
        }

        fn create_key(&self, _hive: Hive, _path: &str) -> Result<bool, SysError> {
            Err(unsupported())
        }

        fn set_values(&self, _change_set: &ChangeSet) -> Result<(), SysError> {
            Err(unsupported())
        }

        fn read_value(
            &self,
            _hive: Hive,
            _path: &str,
            _name: &str,
        ) -> Result<Option<RegValue>, SysError> {
            Err(unsupported())
        }

        fn delete_value(&self, _hive: Hive, _path: &str, _name: &str) -> Result<(), SysError> {
            Err(unsupported())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn every_call_is_unsupported() {
            let registry = UnsupportedRegistry;
            assert!(matches!(
                registry.key_exists(Hive::CurrentUser, "Software"),
                Err(SysError::Unsupported(_))
            ));
            assert!(registry.delete_value(Hive::CurrentUser, "Software", "x").is_err());
        }
    }
}
