use crate::decode::new_id;
use crate::models::{Block, Exercise, PerformanceEntry, WorkoutDraft, WorkoutItem};

/// A single field change on an item. Numbers arrive unvalidated and are clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEdit {
    Sets(i64),
    Reps(i64),
    DurationSec(i64),
    Timed(bool),
    Weight(String),
    RestOverride(bool),
    RestSec(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEdit {
    Name(String),
    Rounds(i64),
    Circuit(bool),
    RestOverride(bool),
    RestSec(i64),
}

fn clamp(value: i64, min: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(u32::MAX)) as u32
}

impl WorkoutDraft {
    /// Adds a catalog exercise, copying its display fields and prefilling
    /// reps and weight from the last recorded performance.
    pub fn add_exercise(
        &mut self,
        exercise: &Exercise,
        recall: Option<&PerformanceEntry>,
    ) -> &WorkoutItem {
        let mut item = WorkoutItem::new(new_id(), exercise.name.clone());
        item.exercise_id = Some(exercise.id.clone());
        item.group = exercise.group.clone();
        if let Some(recall) = recall {
            if let Ok(reps) = recall.reps.trim().parse::<u32>() {
                item.reps = reps.max(1);
            }
            item.weight = recall.weight.clone();
        }
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    pub fn add_freeform(&mut self, name: &str, group: &str) -> &WorkoutItem {
        let mut item = WorkoutItem::new(new_id(), name.trim());
        item.group = group.to_string();
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    pub fn move_item_up(&mut self, item_id: &str) -> bool {
        match self.position(item_id) {
            Some(index) if index > 0 => {
                self.items.swap(index - 1, index);
                true
            }
            _ => false,
        }
    }

    pub fn move_item_down(&mut self, item_id: &str) -> bool {
        match self.position(item_id) {
            Some(index) if index + 1 < self.items.len() => {
                self.items.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn remove_item(&mut self, item_id: &str) -> Option<WorkoutItem> {
        let index = self.position(item_id)?;
        Some(self.items.remove(index))
    }

    /// Sets on a circuit member stay within the block's rounds; a chain
    /// grows its rounds instead.
    pub fn edit_item(&mut self, item_id: &str, edit: ItemEdit) -> bool {
        let circuit = self
            .item(item_id)
            .and_then(|item| self.block_of(item))
            .filter(|block| block.is_circuit)
            .map(|block| (block.id.clone(), block.rounds, block.is_chain));
        let Some(item) = self.item_mut(item_id) else {
            return false;
        };
        match edit {
            ItemEdit::Sets(sets) => {
                let sets = clamp(sets, 1);
                match circuit {
                    Some((block_id, rounds, true)) => {
                        item.sets = sets;
                        if let Some(block) = self.block_mut(&block_id) {
                            block.rounds = rounds.max(sets);
                        }
                    }
                    Some((_, rounds, false)) => item.sets = sets.min(rounds),
                    None => item.sets = sets,
                }
            }
            ItemEdit::Reps(reps) => item.reps = clamp(reps, 1),
            ItemEdit::DurationSec(seconds) => item.duration_sec = clamp(seconds, 1),
            ItemEdit::Timed(timed) => item.is_timed = timed,
            ItemEdit::Weight(weight) => item.weight = weight.trim().to_string(),
            ItemEdit::RestOverride(enabled) => item.rest_override_enabled = enabled,
            ItemEdit::RestSec(seconds) => item.rest_sec = clamp(seconds, 0),
        }
        true
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    pub fn set_global_rest(&mut self, seconds: i64) {
        self.global_rest_sec = clamp(seconds, 0);
    }

    pub fn set_auto_start_rest(&mut self, enabled: bool) {
        self.auto_start_rest = enabled;
    }

    pub fn create_block(&mut self, name: &str, is_circuit: bool) -> &Block {
        let name = if name.trim().is_empty() {
            format!("Block {}", self.blocks.len() + 1)
        } else {
            name.trim().to_string()
        };
        self.blocks.push(Block::new(new_id(), name, is_circuit));
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn edit_block(&mut self, block_id: &str, edit: BlockEdit) -> bool {
        let Some(block) = self.block_mut(block_id) else {
            return false;
        };
        let mut sync_rounds = false;
        match edit {
            BlockEdit::Name(name) => block.name = name.trim().to_string(),
            BlockEdit::Rounds(rounds) => {
                block.rounds = clamp(rounds, 1);
                sync_rounds = block.is_circuit && !block.is_chain;
            }
            BlockEdit::Circuit(is_circuit) => {
                sync_rounds = is_circuit && !block.is_circuit && !block.is_chain;
                block.is_circuit = is_circuit;
            }
            BlockEdit::RestOverride(enabled) => block.rest_override_enabled = enabled,
            BlockEdit::RestSec(seconds) => block.rest_sec = clamp(seconds, 0),
        }
        if sync_rounds {
            let rounds = block.rounds;
            self.sync_member_sets(block_id, rounds);
        }
        true
    }

    /// Removes the block and clears the reference on every member.
    pub fn remove_block(&mut self, block_id: &str) -> Option<Block> {
        let index = self.blocks.iter().position(|block| block.id == block_id)?;
        for item in &mut self.items {
            if item.block_id.as_deref() == Some(block_id) {
                item.block_id = None;
            }
        }
        Some(self.blocks.remove(index))
    }

    /// Moves an item into a block, or out of any block with `None`.
    /// Joining a circuit resets the item's sets to the block's rounds; a chain
    /// only caps them.
    pub fn assign_block(&mut self, item_id: &str, block_id: Option<&str>) -> bool {
        let circuit = match block_id {
            Some(block_id) => match self.block(block_id) {
                Some(block) if block.is_circuit => Some((block.rounds, block.is_chain)),
                Some(_) => None,
                None => return false,
            },
            None => None,
        };
        let Some(item) = self.item_mut(item_id) else {
            return false;
        };
        item.block_id = block_id.map(str::to_string);
        match circuit {
            Some((rounds, true)) => item.sets = item.sets.min(rounds),
            Some((rounds, false)) => item.sets = rounds,
            None => {}
        }
        true
    }

    /// Chains an item with the one after it into a circuit. In a chain both
    /// keep their own sets and the circuit runs as many rounds as the larger
    /// of them. Linking into an existing plain circuit joins it instead.
    pub fn link_with_next(&mut self, item_id: &str) -> Option<String> {
        let index = self.position(item_id)?;
        let next_index = index + 1;
        if next_index >= self.items.len() {
            return None;
        }
        let existing = [index, next_index].into_iter().find_map(|i| {
            self.block_of(&self.items[i])
                .filter(|block| block.is_circuit)
                .map(|block| block.id.clone())
        });
        let block_id = match existing {
            Some(block_id) => block_id,
            None => {
                let name = format!("Circuit {}", self.blocks.len() + 1);
                let mut block = Block::new(new_id(), name, true);
                block.rounds = 1;
                block.is_chain = true;
                let block_id = block.id.clone();
                self.blocks.push(block);
                block_id
            }
        };
        for i in [index, next_index] {
            let item_id = self.items[i].id.clone();
            if self.items[i].block_id.as_deref() != Some(block_id.as_str()) {
                self.join_circuit(&item_id, &block_id);
            }
        }
        Some(block_id)
    }

    pub fn unlink(&mut self, item_id: &str) -> bool {
        match self.item_mut(item_id) {
            Some(item) if item.block_id.is_some() => {
                item.block_id = None;
                true
            }
            _ => false,
        }
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }

    fn join_circuit(&mut self, item_id: &str, block_id: &str) {
        let Some(block) = self.block(block_id) else {
            return;
        };
        let (rounds, is_chain) = (block.rounds, block.is_chain);
        let Some(item) = self.item_mut(item_id) else {
            return;
        };
        item.block_id = Some(block_id.to_string());
        if !is_chain {
            item.sets = rounds;
            return;
        }
        let sets = item.sets;
        if let Some(block) = self.block_mut(block_id) {
            block.rounds = rounds.max(sets);
        }
    }

    fn sync_member_sets(&mut self, block_id: &str, rounds: u32) {
        for item in &mut self.items {
            if item.block_id.as_deref() == Some(block_id) {
                item.sets = rounds;
            }
        }
    }
}
