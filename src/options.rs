//! Runtime option stores for the loader configuration emitted to pages.
//!
//! Two explicit stores replace any ambient global state: [`GlobalOptions`]
//! lives as long as the process (owned by whoever builds the app) and can be
//! locked once startup is done; [`PageOptions`] is created per request and
//! dropped with it. [`OptionContext`] pairs the two for a single request.

use serde_json::{Map, Value};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionScope {
    #[default]
    Page,
    Global,
}

#[derive(Debug, Default)]
pub struct GlobalOptions {
    values: Map<String, Value>,
    locked: bool,
}

impl GlobalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse any further writes.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    fn values_mut(&mut self) -> Result<&mut Map<String, Value>, ConfigError> {
        if self.locked {
            return Err(ConfigError::OptionsLocked);
        }
        Ok(&mut self.values)
    }
}

#[derive(Debug, Default)]
pub struct PageOptions {
    values: Map<String, Value>,
}

impl PageOptions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// The stores visible while handling one request.
pub struct OptionContext<'a> {
    global: &'a mut GlobalOptions,
    page: PageOptions,
}

impl<'a> OptionContext<'a> {
    pub fn new(global: &'a mut GlobalOptions) -> Self {
        Self {
            global,
            page: PageOptions::default(),
        }
    }

    pub fn page(&self) -> &PageOptions {
        &self.page
    }

    pub fn global(&self) -> &GlobalOptions {
        &*self.global
    }

    /// Set `key`, replacing whatever was there.
    pub fn add_option(
        &mut self,
        key: impl Into<String>,
        value: Value,
        scope: OptionScope,
    ) -> Result<(), ConfigError> {
        self.store_mut(scope)?.insert(key.into(), value);
        Ok(())
    }

    /// Set an object-valued `key`. When an object is already stored and
    /// `clear_existing` is false, the new keys are written into it and the
    /// old keys that were not mentioned stay.
    pub fn add_object_option(
        &mut self,
        key: impl Into<String>,
        value: Map<String, Value>,
        scope: OptionScope,
        clear_existing: bool,
    ) -> Result<(), ConfigError> {
        let store = self.store_mut(scope)?;
        let key = key.into();
        if !clear_existing {
            if let Some(Value::Object(existing)) = store.get_mut(&key) {
                existing.extend(value);
                return Ok(());
            }
        }
        store.insert(key, Value::Object(value));
        Ok(())
    }

    pub fn get_option(&self, key: &str, scope: OptionScope) -> Option<&Value> {
        match scope {
            OptionScope::Page => self.page.get(key),
            OptionScope::Global => self.global.get(key),
        }
    }

    pub fn clear(&mut self, scope: OptionScope) -> Result<(), ConfigError> {
        self.store_mut(scope)?.clear();
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<(), ConfigError> {
        self.clear(OptionScope::Global)?;
        self.clear(OptionScope::Page)
    }

    /// Page values layered over global ones.
    pub fn effective(&self) -> Map<String, Value> {
        let mut merged = self.global.values.clone();
        merged.extend(self.page.values.clone());
        merged
    }

    /// Ends the request, dropping its page options.
    pub fn into_page(self) -> PageOptions {
        self.page
    }

    fn store_mut(&mut self, scope: OptionScope) -> Result<&mut Map<String, Value>, ConfigError> {
        match scope {
            OptionScope::Page => Ok(&mut self.page.values),
            OptionScope::Global => self.global.values_mut(),
        }
    }
}
