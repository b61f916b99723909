// Action sets: named groups of actions, one of which is active

use super::action::ActionId;
use std::collections::HashMap;

/// A named mapping from action names to actions
#[derive(Debug, Clone)]
pub struct ActionSet {
    name: String,
    actions: HashMap<String, ActionId>,
}

impl ActionSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an action. Returns false if the name is already taken here.
    pub fn insert(&mut self, name: impl Into<String>, id: ActionId) -> bool {
        let name = name.into();
        if self.actions.contains_key(&name) {
            return false;
        }
        self.actions.insert(name, id);
        true
    }

    pub fn get(&self, name: &str) -> Option<ActionId> {
        self.actions.get(name).copied()
    }

    /// Action names, sorted
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_set_insert_and_lookup() {
        let mut set = ActionSet::new("Gameplay");
        assert!(set.is_empty());
        assert!(set.insert("move", ActionId(0)));
        assert!(set.insert("jump", ActionId(1)));

        assert_eq!(set.name(), "Gameplay");
        assert_eq!(set.get("jump"), Some(ActionId(1)));
        assert_eq!(set.get("crouch"), None);
        assert_eq!(set.len(), 2);
        assert_eq!(set.action_names(), vec!["jump", "move"]);
    }

    #[test]
    fn test_action_set_rejects_duplicate_names() {
        let mut set = ActionSet::new("Menu");
        assert!(set.insert("confirm", ActionId(4)));
        assert!(!set.insert("confirm", ActionId(5)));
        assert_eq!(set.get("confirm"), Some(ActionId(4)));
    }
}
