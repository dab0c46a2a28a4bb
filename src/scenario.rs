use anyhow::{Context, Result};
use serde::Deserialize;
use slotinv_core::{ContentRule, ItemQuantities, Modifier, ModifierData, SlotRule};
use slotinv_inventory::{InventoryConfig, SlotInventory};
use slotinv_testkit::{ChangeRecord, JsonlSink, RecordingSink};
use std::{collections::BTreeSet, fs, path::Path};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    inventories: Vec<InventoryDef>,
    steps: Vec<Step>,
}

/// Inventory declared by a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryDef {
    pub name: String,
    #[serde(default)]
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemAmount {
    pub item: String,
    pub quantity: i32,
}

/// One scripted operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Receive {
        inventory: String,
        items: Vec<ItemAmount>,
        #[serde(default)]
        atomic: bool,
    },
    ReceiveExact {
        inventory: String,
        items: Vec<ItemAmount>,
    },
    Drop {
        from: String,
        index: usize,
        to: String,
    },
    DropAt {
        from: String,
        index: usize,
        to: String,
        dest_index: usize,
        #[serde(default)]
        max_amount: u32,
    },
    Move {
        inventory: String,
        from: usize,
        to: usize,
        #[serde(default)]
        swap: bool,
        #[serde(default)]
        max_amount: u32,
    },
    Regroup {
        inventory: String,
        index: usize,
    },
    Clear {
        inventory: String,
        index: usize,
    },
    SetCapacity {
        inventory: String,
        capacity: usize,
    },
    AddModifier {
        inventory: String,
        index: usize,
        kind: String,
        #[serde(default)]
        data: ModifierData,
    },
    Modify {
        inventory: String,
        index: usize,
        delta: i32,
        #[serde(default)]
        atomic: bool,
    },
    Split {
        inventory: String,
        index: usize,
        amount: u32,
    },
}

impl Step {
    fn inventories(&self) -> Vec<&str> {
        match self {
            Step::Drop { from, to, .. } | Step::DropAt { from, to, .. } => {
                vec![from.as_str(), to.as_str()]
            }
            Step::Receive { inventory, .. }
            | Step::ReceiveExact { inventory, .. }
            | Step::Move { inventory, .. }
            | Step::Regroup { inventory, .. }
            | Step::Clear { inventory, .. }
            | Step::SetCapacity { inventory, .. }
            | Step::AddModifier { inventory, .. }
            | Step::Modify { inventory, .. }
            | Step::Split { inventory, .. } => vec![inventory.as_str()],
        }
    }
}

fn batch(items: &[ItemAmount]) -> ItemQuantities {
    items
        .iter()
        .map(|entry| (entry.item.as_str(), entry.quantity))
        .collect()
}

/// A validated inventory scenario.
#[derive(Debug)]
pub struct Scenario {
    inventories: Vec<InventoryDef>,
    steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_str(&contents)
    }

    /// Load a scenario from an in-memory JSON string.
    pub fn from_str(contents: &str) -> Result<Self> {
        let file: ScenarioFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scenario contains no steps");
        }

        let mut names = BTreeSet::new();
        for def in &file.inventories {
            if !names.insert(def.name.as_str()) {
                anyhow::bail!("inventory {:?} declared twice", def.name);
            }
        }

        for (position, step) in file.steps.iter().enumerate() {
            for name in step.inventories() {
                if !names.contains(name) {
                    anyhow::bail!("step {position} references unknown inventory {name:?}");
                }
            }
            if let Step::Drop { from, to, .. } | Step::DropAt { from, to, .. } = step {
                if from == to {
                    anyhow::bail!("step {position} drops from {from:?} into itself; use move");
                }
            }
        }

        Ok(Self {
            inventories: file.inventories,
            steps: file.steps,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Totals reported after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub applied_steps: usize,
    pub notifications: usize,
    pub overflow: ItemQuantities,
}

/// Owns the named inventories of a scenario and applies its steps.
pub struct ScenarioRunner {
    names: Vec<String>,
    inventories: Vec<SlotInventory>,
}

impl ScenarioRunner {
    /// Create the scenario's inventories from the shared config.
    pub fn new(scenario: &Scenario, config: &InventoryConfig) -> Result<Self> {
        let stack_sizes = config
            .stack_size_table()
            .context("invalid stack sizes in inventory config")?;
        let names = scenario.inventories.iter().map(|def| def.name.clone()).collect();
        let inventories = scenario
            .inventories
            .iter()
            .map(|def| SlotInventory::new(def.capacity.unwrap_or(config.capacity), stack_sizes.clone()))
            .collect();
        Ok(Self { names, inventories })
    }

    /// Named inventories in declaration order.
    pub fn inventories(&self) -> impl Iterator<Item = (&str, &SlotInventory)> + '_ {
        self.names.iter().map(String::as_str).zip(self.inventories.iter())
    }

    /// Run every step, flushing all inventories after each one.
    pub fn run(&mut self, scenario: &Scenario, mut log: Option<&mut JsonlSink>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut recorder = RecordingSink::new();

        for (position, step) in scenario.steps().iter().enumerate() {
            let (applied, overflow) = self.apply(step)?;
            debug!(step = position, ?step, applied, "applied scenario step");
            summary.steps += 1;
            if applied {
                summary.applied_steps += 1;
            }
            summary.overflow.extend(overflow.iter().map(|(item, quantity)| (item.clone(), quantity)));

            for (name, inventory) in self.names.iter().zip(self.inventories.iter_mut()) {
                inventory.flush(&mut recorder);
                for event in recorder.take() {
                    summary.notifications += 1;
                    if let Some(sink) = log.as_deref_mut() {
                        sink.write(&ChangeRecord {
                            step: position as u64,
                            inventory: name,
                            event: &event,
                        })?;
                    }
                }
            }
        }

        info!(
            steps = summary.steps,
            applied = summary.applied_steps,
            notifications = summary.notifications,
            overflow = summary.overflow.total_magnitude(),
            "scenario finished"
        );
        Ok(summary)
    }

    fn apply(&mut self, step: &Step) -> Result<(bool, ItemQuantities)> {
        let outcome = match step {
            Step::Receive {
                inventory,
                items,
                atomic,
            } => {
                let rule = ContentRule {
                    atomic: *atomic,
                    ..ContentRule::default()
                };
                let result = self.get_mut(inventory)?.receive_stacks_with(&batch(items), &rule);
                (result.modified_something, result.overflow)
            }
            Step::ReceiveExact { inventory, items } => {
                let applied = self.get_mut(inventory)?.try_receive_stacks_exact(&batch(items));
                (applied, ItemQuantities::new())
            }
            Step::Drop { from, index, to } => {
                let (source, dest) = self.pair_mut(from, to)?;
                (source.drop_slot(*index, dest), ItemQuantities::new())
            }
            Step::DropAt {
                from,
                index,
                to,
                dest_index,
                max_amount,
            } => {
                let (source, dest) = self.pair_mut(from, to)?;
                (
                    source.drop_slot_at(*index, dest, *dest_index, *max_amount),
                    ItemQuantities::new(),
                )
            }
            Step::Move {
                inventory,
                from,
                to,
                swap,
                max_amount,
            } => {
                let rule = SlotRule {
                    allow_swap: *swap,
                    max_transfer_quantity: *max_amount,
                    ..SlotRule::default()
                };
                (self.get_mut(inventory)?.move_slot(*from, *to, &rule), ItemQuantities::new())
            }
            Step::Regroup { inventory, index } => (
                self.get_mut(inventory)?.regroup_similar_items_at(*index),
                ItemQuantities::new(),
            ),
            Step::Clear { inventory, index } => {
                (self.get_mut(inventory)?.clear_slot(*index), ItemQuantities::new())
            }
            Step::SetCapacity {
                inventory,
                capacity,
            } => {
                let inventory = self.get_mut(inventory)?;
                let changed = inventory.capacity() != *capacity;
                inventory.set_capacity(*capacity);
                (changed, ItemQuantities::new())
            }
            Step::AddModifier {
                inventory,
                index,
                kind,
                data,
            } => {
                let modifier = Modifier::new(kind.as_str(), data.clone());
                (self.get_mut(inventory)?.add_modifier(*index, modifier), ItemQuantities::new())
            }
            Step::Modify {
                inventory,
                index,
                delta,
                atomic,
            } => {
                let inventory = self.get_mut(inventory)?;
                let item = inventory.slot(*index).and_then(|slot| slot.stack_item()).cloned();
                let remaining = inventory.modify_slot_quantity(*index, *delta, *atomic);
                let overflow = match item {
                    Some(item) if remaining != 0 => ItemQuantities::new().with(item, remaining),
                    _ => ItemQuantities::new(),
                };
                (remaining != *delta, overflow)
            }
            Step::Split {
                inventory,
                index,
                amount,
            } => (
                self.get_mut(inventory)?.split_slot(*index, *amount).is_some(),
                ItemQuantities::new(),
            ),
        };
        Ok(outcome)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut SlotInventory> {
        let index = self
            .position(name)
            .with_context(|| format!("unknown inventory {name:?}"))?;
        Ok(&mut self.inventories[index])
    }

    fn pair_mut(&mut self, first: &str, second: &str) -> Result<(&mut SlotInventory, &mut SlotInventory)> {
        let a = self
            .position(first)
            .with_context(|| format!("unknown inventory {first:?}"))?;
        let b = self
            .position(second)
            .with_context(|| format!("unknown inventory {second:?}"))?;
        if a == b {
            anyhow::bail!("inventory {first:?} cannot drop into itself");
        }
        if a < b {
            let (head, tail) = self.inventories.split_at_mut(b);
            Ok((&mut head[a], &mut tail[0]))
        } else {
            let (head, tail) = self.inventories.split_at_mut(a);
            Ok((&mut tail[0], &mut head[b]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotinv_core::{ItemId, Slot};

    fn config() -> InventoryConfig {
        InventoryConfig::from_toml_str("capacity = 2\ndefault_max_stack_size = 64\n[stack_sizes]\nsword = 1\n")
            .expect("valid config")
    }

    #[test]
    fn scenario_rejects_unknown_inventories() {
        let json = r#"{
            "inventories": [{"name": "player"}],
            "steps": [{"op": "clear", "inventory": "chest", "index": 0}]
        }"#;
        let err = Scenario::from_str(json).unwrap_err();
        assert!(
            err.to_string().contains("unknown inventory"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn scenario_rejects_self_drops_and_empty_scripts() {
        let json = r#"{
            "inventories": [{"name": "player"}],
            "steps": [{"op": "drop", "from": "player", "index": 0, "to": "player"}]
        }"#;
        assert!(Scenario::from_str(json).is_err());
        assert!(Scenario::from_str(r#"{"inventories": [], "steps": []}"#).is_err());
        let twice = r#"{
            "inventories": [{"name": "a"}, {"name": "a"}],
            "steps": [{"op": "regroup", "inventory": "a", "index": 0}]
        }"#;
        assert!(Scenario::from_str(twice).is_err());
    }

    #[test]
    fn runner_moves_stacks_between_inventories() {
        let json = r#"{
            "inventories": [{"name": "player"}, {"name": "chest", "capacity": 3}],
            "steps": [
                {"op": "receive", "inventory": "player", "items": [{"item": "wood", "quantity": 100}, {"item": "sword", "quantity": 2}]},
                {"op": "drop", "from": "player", "index": 0, "to": "chest"},
                {"op": "add_modifier", "inventory": "chest", "index": 0, "kind": "durability", "data": {"integer": 12}},
                {"op": "modify", "inventory": "player", "index": 1, "delta": 28},
                {"op": "regroup", "inventory": "chest", "index": 2}
            ]
        }"#;
        let scenario = Scenario::from_str(json).expect("scenario should parse");
        let mut runner = ScenarioRunner::new(&scenario, &config()).expect("runner");

        let summary = runner.run(&scenario, None).expect("run");

        let inventories: Vec<_> = runner.inventories().collect();
        let (_, player) = inventories[0];
        let (_, chest) = inventories[1];
        assert_eq!(inventories[1].0, "chest");
        assert_eq!(player.slot(0), Some(&Slot::default()));
        assert_eq!(player.slot(1), Some(&Slot::new("wood", 64)));
        assert_eq!(chest.capacity(), 3);
        assert_eq!(chest.item_quantity(&ItemId::new("wood")), 64);
        assert!(chest.slot(0).is_some_and(Slot::has_modifiers));

        assert_eq!(summary.steps, 5);
        assert_eq!(summary.applied_steps, 4);
        assert_eq!(summary.overflow.get(&ItemId::new("sword")), Some(2));
        assert_eq!(summary.overflow.get(&ItemId::new("wood")), None);
    }
}
