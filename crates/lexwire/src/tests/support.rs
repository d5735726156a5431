//! Domain objects and renderers shared by the unit tests.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::DecodeError;
use crate::registry::Registry;
use crate::renderer::{DecodeOptions, ObjectRenderer};
use crate::value::{DomainObject, Value, ValueMap};

#[derive(Debug)]
pub(crate) struct Process {
    pub(crate) pid: u64,
    pub(crate) name: String,
    pub(crate) space: Value,
}

impl Process {
    pub(crate) fn value(pid: u64, name: &str) -> Value {
        Value::object(Self {
            pid,
            name: name.to_owned(),
            space: Value::object(AddressSpace::new("WindowsAMD64PagedMemory")),
        })
    }
}

impl DomainObject for Process {
    fn type_tags(&self) -> &[&'static str] {
        &["Process", "BaseObject"]
    }

    fn object_id(&self) -> Option<u64> {
        Some(self.pid)
    }
}

/// Counts reconstructions so tests can observe identity caching.
#[derive(Debug, Default, Clone)]
pub(crate) struct ProcessRenderer {
    pub(crate) built: Rc<Cell<usize>>,
}

impl ObjectRenderer for ProcessRenderer {
    fn name(&self) -> &str {
        "Process"
    }

    fn renders_types(&self) -> &[&str] {
        &["Process"]
    }

    fn get_state(&self, item: &Value) -> Value {
        let Some(process) = item.downcast_ref::<Process>() else {
            return Value::Null;
        };
        let mut state = ValueMap::new();
        state.insert("pid".into(), Value::from(process.pid));
        state.insert("name".into(), Value::from(process.name.as_str()));
        state.insert("space".into(), process.space.clone());
        Value::Map(state)
    }

    fn reconstruct(
        &self,
        mut state: ValueMap,
        _options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        let pid = state
            .get("pid")
            .and_then(Value::as_u64)
            .ok_or_else(|| DecodeError::reconstruct(self.name(), "missing pid"))?;
        let name = state
            .get("name")
            .and_then(Value::as_text)
            .unwrap_or_default()
            .to_owned();
        let space = state.remove("space").unwrap_or_default();
        self.built.set(self.built.get() + 1);
        Ok(Value::object(Process { pid, name, space }))
    }
}

#[derive(Debug)]
pub(crate) struct AddressSpace {
    pub(crate) class: String,
}

impl AddressSpace {
    pub(crate) fn new(class: &str) -> Self {
        Self {
            class: class.to_owned(),
        }
    }
}

impl DomainObject for AddressSpace {
    fn type_tags(&self) -> &[&'static str] {
        &["AddressSpace"]
    }
}

/// Rebuilds address spaces from a fixed class table.
#[derive(Debug, Clone)]
pub(crate) struct AddressSpaceRenderer {
    classes: Vec<&'static str>,
}

impl Default for AddressSpaceRenderer {
    fn default() -> Self {
        Self {
            classes: vec!["WindowsAMD64PagedMemory", "FileAddressSpace"],
        }
    }
}

impl ObjectRenderer for AddressSpaceRenderer {
    fn name(&self) -> &str {
        "AddressSpace"
    }

    fn renders_types(&self) -> &[&str] {
        &["AddressSpace"]
    }

    fn get_state(&self, item: &Value) -> Value {
        let Some(space) = item.downcast_ref::<AddressSpace>() else {
            return Value::Null;
        };
        let mut state = ValueMap::new();
        state.insert("cls".into(), Value::from(space.class.as_str()));
        Value::Map(state)
    }

    fn reconstruct(
        &self,
        state: ValueMap,
        _options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        let class = state
            .get("cls")
            .and_then(Value::as_text)
            .ok_or_else(|| DecodeError::reconstruct(self.name(), "missing cls"))?;
        if !self.classes.contains(&class) {
            return Err(DecodeError::reconstruct(
                self.name(),
                format!("unknown address space class '{class}'"),
            ));
        }
        Ok(Value::object(AddressSpace::new(class)))
    }
}

/// Generic fallback claiming every `BaseObject`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BaseObjectRenderer;

impl ObjectRenderer for BaseObjectRenderer {
    fn name(&self) -> &str {
        "BaseObject"
    }

    fn renders_types(&self) -> &[&str] {
        &["BaseObject"]
    }

    fn get_state(&self, item: &Value) -> Value {
        let mut state = ValueMap::new();
        state.insert("repr".into(), Value::from(item.type_name()));
        Value::Map(state)
    }

    fn reconstruct(
        &self,
        state: ValueMap,
        _options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        Ok(Value::Map(state))
    }
}

#[derive(Debug)]
pub(crate) struct Broken;

impl DomainObject for Broken {
    fn type_tags(&self) -> &[&'static str] {
        &["Broken"]
    }
}

/// Violates the state contract by returning a list.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BrokenRenderer;

impl ObjectRenderer for BrokenRenderer {
    fn name(&self) -> &str {
        "Broken"
    }

    fn renders_types(&self) -> &[&str] {
        &["Broken"]
    }

    fn get_state(&self, _item: &Value) -> Value {
        Value::List(vec![Value::from(1_u64)])
    }

    fn reconstruct(
        &self,
        state: ValueMap,
        _options: &mut DecodeOptions,
    ) -> Result<Value, DecodeError> {
        Ok(Value::Map(state))
    }
}

#[derive(Debug)]
pub(crate) struct Untracked;

impl DomainObject for Untracked {
    fn type_tags(&self) -> &[&'static str] {
        &["Untracked"]
    }
}

/// Registry with the built-ins plus the test renderers.
pub(crate) fn registry_with(process: ProcessRenderer) -> Registry {
    let mut registry = Registry::with_builtins();
    registry.register(process).expect("register process");
    registry
        .register(AddressSpaceRenderer::default())
        .expect("register address space");
    registry.register(BrokenRenderer).expect("register broken");
    registry
}

pub(crate) fn registry() -> Registry {
    registry_with(ProcessRenderer::default())
}

