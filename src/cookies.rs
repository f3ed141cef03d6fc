//! Cookie persistence between runs.
//!
//! A logged-in browser's cookies are saved after login and installed again
//! when the next session opens the home page, which usually skips the login
//! form. The list is opaque to the workflows.
//!
//! With the `persistence` feature, [`FileCookieStore`] keeps the list as JSON
//! Lines, one cookie per line.

use crate::dom::Cookie;
use crate::error::Result;

/// Where session cookies live between runs.
pub trait CookieStore {
    /// Saved cookies, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Vec<Cookie>>>;

    /// Replace the saved cookies.
    fn save(&mut self, cookies: &[Cookie]) -> Result<()>;
}

/// Keeps cookies for the life of the process only.
#[derive(Clone, Debug, Default)]
pub struct MemoryCookieStore {
    cookies: Option<Vec<Cookie>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `cookies`.
    pub fn with_cookies(cookies: Vec<Cookie>) -> Self {
        Self {
            cookies: Some(cookies),
        }
    }
}

impl CookieStore for MemoryCookieStore {
    fn load(&self) -> Result<Option<Vec<Cookie>>> {
        Ok(self.cookies.clone())
    }

    fn save(&mut self, cookies: &[Cookie]) -> Result<()> {
        self.cookies = Some(cookies.to_vec());
        Ok(())
    }
}

#[cfg(feature = "persistence")]
pub use file::FileCookieStore;

#[cfg(feature = "persistence")]
mod file {
    use std::fs;
    use std::io::{self, BufRead, Write};
    use std::path::{Path, PathBuf};

    use super::CookieStore;
    use crate::dom::Cookie;
    use crate::error::{Error, Result};

    /// Cookies saved as JSON Lines at a fixed path.
    #[derive(Clone, Debug)]
    pub struct FileCookieStore {
        path: PathBuf,
    }

    impl FileCookieStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    fn store_err(path: &Path, e: impl std::fmt::Display) -> Error {
        Error::CookieStore(format!("{}: {e}", path.display()))
    }

    impl CookieStore for FileCookieStore {
        fn load(&self) -> Result<Option<Vec<Cookie>>> {
            let file = match fs::File::open(&self.path) {
                Ok(f) => f,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(store_err(&self.path, e)),
            };
            let mut cookies = Vec::new();
            for (line_num, line) in io::BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| store_err(&self.path, e))?;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let cookie: Cookie = serde_json::from_str(line)
                    .map_err(|e| store_err(&self.path, format!("line {}: {e}", line_num + 1)))?;
                cookies.push(cookie);
            }
            Ok(Some(cookies))
        }

        fn save(&mut self, cookies: &[Cookie]) -> Result<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| store_err(parent, e))?;
                }
            }
            let file = fs::File::create(&self.path).map_err(|e| store_err(&self.path, e))?;
            let mut writer = io::BufWriter::new(file);
            for cookie in cookies {
                let json = serde_json::to_string(cookie).map_err(|e| store_err(&self.path, e))?;
                writeln!(writer, "{json}").map_err(|e| store_err(&self.path, e))?;
            }
            writer.flush().map_err(|e| store_err(&self.path, e))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_starts_empty() {
        let store = MemoryCookieStore::new();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn memory_store_replaces_on_save() {
        let mut store = MemoryCookieStore::with_cookies(vec![Cookie::new("a", "1")]);
        store.save(&[Cookie::new("b", "2")]).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, vec![Cookie::new("b", "2")]);
    }
}
