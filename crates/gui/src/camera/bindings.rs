//! First-person key bindings: a one-to-one map between keys and motion flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CameraError, Key};

/// Motion intent toggled by a held key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Motion {
    pub const ALL: [Motion; 6] = [
        Motion::Forward,
        Motion::Backward,
        Motion::Left,
        Motion::Right,
        Motion::Up,
        Motion::Down,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Motion::Forward => "Forward",
            Motion::Backward => "Backward",
            Motion::Left => "Strafe left",
            Motion::Right => "Strafe right",
            Motion::Up => "Up",
            Motion::Down => "Down",
        }
    }
}

/// Validated binding table. Every key maps to one motion and every motion
/// has at most one key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    by_key: BTreeMap<Key, Motion>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let pairs = [
            (Key::Char('w'), Motion::Forward),
            (Key::Char('s'), Motion::Backward),
            (Key::Char('a'), Motion::Left),
            (Key::Char('d'), Motion::Right),
            (Key::Char('e'), Motion::Up),
            (Key::Char('q'), Motion::Down),
        ];
        Self {
            by_key: pairs.into_iter().collect(),
        }
    }
}

impl KeyBindings {
    /// Table as stored in settings: motion → key name
    pub fn default_table() -> BTreeMap<Motion, String> {
        KeyBindings::default().to_table()
    }

    /// Validate a motion → key name table
    pub fn from_table(table: &BTreeMap<Motion, String>) -> Result<Self, CameraError> {
        let mut by_key = BTreeMap::new();
        for (motion, name) in table {
            let key: Key = name.parse()?;
            if let Some(previous) = by_key.insert(key, *motion) {
                return Err(CameraError::InvalidBinding(format!(
                    "key '{}' bound to both {:?} and {:?}",
                    key, previous, motion
                )));
            }
        }
        Ok(Self { by_key })
    }

    pub fn to_table(&self) -> BTreeMap<Motion, String> {
        self.by_key
            .iter()
            .map(|(key, motion)| (*motion, key.to_string()))
            .collect()
    }

    /// Motion bound to `key`, ignoring character case
    pub fn motion_for(&self, key: Key) -> Option<Motion> {
        self.by_key.get(&key.normalized()).copied()
    }

    pub fn key_for(&self, motion: Motion) -> Option<Key> {
        self.by_key
            .iter()
            .find(|(_, m)| **m == motion)
            .map(|(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wasd_eq() {
        let b = KeyBindings::default();
        assert_eq!(b.motion_for(Key::Char('w')), Some(Motion::Forward));
        assert_eq!(b.motion_for(Key::Char('S')), Some(Motion::Backward));
        assert_eq!(b.motion_for(Key::Char('e')), Some(Motion::Up));
        assert_eq!(b.motion_for(Key::Char('q')), Some(Motion::Down));
        assert_eq!(b.motion_for(Key::Up), None);
        assert_eq!(b.key_for(Motion::Left), Some(Key::Char('a')));
    }

    #[test]
    fn test_table_round_trip() {
        let table = KeyBindings::default_table();
        assert_eq!(table[&Motion::Right], "d");
        assert_eq!(KeyBindings::from_table(&table).unwrap(), KeyBindings::default());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut table = KeyBindings::default_table();
        table.insert(Motion::Up, "W".into());
        assert!(matches!(
            KeyBindings::from_table(&table),
            Err(CameraError::InvalidBinding(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut table = KeyBindings::default_table();
        table.insert(Motion::Down, "ctrl".into());
        assert!(KeyBindings::from_table(&table).is_err());
    }

    #[test]
    fn test_partial_table_leaves_motion_unbound() {
        let mut table = KeyBindings::default_table();
        table.remove(&Motion::Up);
        table.insert(Motion::Forward, "up".into());
        let b = KeyBindings::from_table(&table).unwrap();
        assert_eq!(b.key_for(Motion::Up), None);
        assert_eq!(b.motion_for(Key::Up), Some(Motion::Forward));
        assert_eq!(b.motion_for(Key::Char('w')), None);
    }
}
