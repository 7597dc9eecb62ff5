//! Slot + generation table mapping opaque `u64` handles to owned values.
//!
//! Deinitialised handles carry a stale generation and resolve to `None`
//! instead of touching freed memory, so double-deinit and use-after-deinit
//! from C are reported, not undefined. Handle `0` is never issued, which
//! lets C callers treat a zero-initialised handle as "no array".

/// Upper 32 bits: slot index. Lower 32 bits: generation (never 0).
fn pack(slot: u32, generation: u32) -> u64 {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (usize, u32) {
    ((handle >> 32) as usize, handle as u32)
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        if let Some(slot) = self.vacant.pop() {
            let entry = &mut self.entries[slot as usize];
            entry.value = Some(value);
            return pack(slot, entry.generation);
        }
        let slot = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 1,
            value: Some(value),
        });
        pack(slot, 1)
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        let (slot, generation) = unpack(handle);
        let entry = self.entries.get(slot)?;
        if entry.generation != generation {
            return None;
        }
        entry.value.as_ref()
    }

    /// Take the value out, invalidating `handle`.
    ///
    /// A slot whose generation would wrap to 0 is retired instead of
    /// recycled, so an old handle can never resolve to a new value.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (slot, generation) = unpack(handle);
        let entry = self.entries.get_mut(slot)?;
        if entry.generation != generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(slot as u32);
        }
        Some(value)
    }

    /// Number of live values.
    pub fn live(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }
}
