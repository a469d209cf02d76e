//! In-memory container, used for tests and for staging trees before they
//! are written elsewhere.

use std::cell::RefCell;
use std::rc::Rc;

use crate::domain::Value;
use crate::infrastructure::error::{ContainerError, ContainerResult};
use crate::infrastructure::traits::{validate_group_name, Group};

#[derive(Debug, Default)]
struct GroupData {
    name: String,
    location: String,
    attrs: Vec<(String, Value)>,
    groups: Vec<MemoryGroup>,
}

/// Handle to an in-memory group. Clones refer to the same group.
#[derive(Debug, Clone, Default)]
pub struct MemoryGroup(Rc<RefCell<GroupData>>);

impl MemoryGroup {
    /// A new, empty file-level group.
    pub fn new_file() -> Self {
        Self(Rc::new(RefCell::new(GroupData {
            location: "/".to_string(),
            ..GroupData::default()
        })))
    }
}

impl Group for MemoryGroup {
    fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    fn location(&self) -> String {
        self.0.borrow().location.clone()
    }

    fn create_group(&self, name: &str) -> ContainerResult<Self> {
        validate_group_name(name)?;
        if self.group(name)?.is_some() {
            return Err(ContainerError::GroupExists(format!(
                "{}/{}",
                self.location().trim_end_matches('/'),
                name
            )));
        }
        let child = Self(Rc::new(RefCell::new(GroupData {
            name: name.to_string(),
            location: format!("{}/{}", self.location().trim_end_matches('/'), name),
            ..GroupData::default()
        })));
        self.0.borrow_mut().groups.push(child.clone());
        Ok(child)
    }

    fn group(&self, name: &str) -> ContainerResult<Option<Self>> {
        Ok(self
            .0
            .borrow()
            .groups
            .iter()
            .find(|g| g.0.borrow().name == name)
            .cloned())
    }

    fn groups(&self) -> ContainerResult<Vec<Self>> {
        Ok(self.0.borrow().groups.clone())
    }

    fn set_attr(&self, key: &str, value: Value) -> ContainerResult<()> {
        let mut data = self.0.borrow_mut();
        match data.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => data.attrs.push((key.to_string(), value)),
        }
        Ok(())
    }

    fn attr(&self, key: &str) -> ContainerResult<Option<Value>> {
        Ok(self
            .0
            .borrow()
            .attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    fn attrs(&self) -> ContainerResult<Vec<(String, Value)>> {
        Ok(self.0.borrow().attrs.clone())
    }
}
