use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use hocon::{Hocon, HoconLoader};

/// Loads configuration values from a HOCON file with environment variable
/// overrides. Values are first looked up in the environment, then in the
/// named scope of the file, then at the top level of the file.
#[derive(Debug)]
pub struct ConfigLoader {
    hocon: Hocon,
    env: HashMap<String, String>,
    scope: String,
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>, scope: String) -> Result<Self> {
        let path = path.as_ref();
        let env = std::env::vars().collect::<HashMap<_, _>>();

        let hocon = HoconLoader::new()
            .load_file(path)
            .with_context(|| format!("Failed to find or load config file at: {:?}", path))?
            .hocon()?;

        Ok(Self { hocon, env, scope })
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.env.get(name) {
            return Some(Value::String(value.clone()));
        }

        let scoped = &self.hocon[self.scope.as_str()];
        if matches!(scoped, Hocon::Hash(_)) {
            if let Some(value) = Self::value_of(scoped, name) {
                return Some(value);
            }
        }

        Self::value_of(&self.hocon, name)
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(|v| v.as_f32())
    }

    pub fn get_usize(&self, name: &str) -> Option<usize> {
        self.get(name).and_then(|v| v.as_usize())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    pub fn load<T: Config>(&self) -> Result<T> {
        T::load(self)
    }

    fn value_of(hocon: &Hocon, name: &str) -> Option<Value> {
        match &hocon[name] {
            Hocon::Real(val) => Some(Value::Float(*val as f32)),
            Hocon::Integer(val) => Some(Value::Integer(*val as usize)),
            Hocon::String(val) => Some(Value::String(val.clone())),
            Hocon::Boolean(val) => Some(Value::Boolean(*val)),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum Value {
    String(String),
    Integer(usize),
    Float(f32),
    Boolean(bool),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(val) => Some(*val),
            Value::String(val) => val.parse::<bool>().ok(),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Value::Integer(val) => Some(*val),
            Value::String(val) => val.parse::<usize>().ok(),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(val) => Some(*val),
            Value::Integer(val) => Some(*val as f32),
            Value::String(val) => val.parse::<f32>().ok(),
            _ => None,
        }
    }
}

pub trait Config {
    fn load(config: &ConfigLoader) -> Result<Self>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".conf")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_top_level_value() {
        let file = write_config("alpha = 1.5\ncount = 7\n");
        let loader = ConfigLoader::new(file.path(), "missing".to_string()).unwrap();

        assert_eq!(loader.get_f32("alpha"), Some(1.5));
        assert_eq!(loader.get_usize("count"), Some(7));
    }

    #[test]
    fn test_scoped_value_shadows_top_level() {
        let file = write_config("alpha = 1.5\nbook { alpha = 2.5 }\n");
        let loader = ConfigLoader::new(file.path(), "book".to_string()).unwrap();

        assert_eq!(loader.get_f32("alpha"), Some(2.5));
    }

    #[test]
    fn test_missing_value_is_none() {
        let file = write_config("alpha = 1.5\n");
        let loader = ConfigLoader::new(file.path(), "book".to_string()).unwrap();

        assert!(loader.get("beta").is_none());
    }

    #[test]
    fn test_missing_file_is_err() {
        assert!(ConfigLoader::new("/definitely/not/here.conf", "book".to_string()).is_err());
    }
}
