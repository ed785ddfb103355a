//! Identifier allocation.
//!
//! Entity identifiers are the join keys between PresentationML and the entity
//! JSON and are issued as `<prefix><index>` with one index per document;
//! [`IdAllocator::reset`] starts a new document.
//! Generated element identifiers (the `id`/`for` pairs of labelled form
//! controls) come from [`ShortId`].

use log::trace;
use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Source of identifiers for one parse
pub trait IdAllocator: Send {
    /// Identifier for an entity record, e.g. `keyword1`
    fn entity_id(&mut self, prefix: &str) -> String;

    /// Identifier for a generated presentation element
    fn element_id(&mut self, prefix: &str) -> String;

    /// Forget the ids issued so far; called before each parse
    fn reset(&mut self);
}

/// Sequential entity ids, short random element ids
#[derive(Debug, Default)]
pub struct DefaultIdAllocator {
    index: u32,
    short_id: ShortId,
}

impl DefaultIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdAllocator for DefaultIdAllocator {
    fn entity_id(&mut self, prefix: &str) -> String {
        self.index += 1;
        format!("{prefix}{}", self.index)
    }

    fn element_id(&mut self, prefix: &str) -> String {
        format!("{prefix}-{}", self.short_id.generate())
    }

    fn reset(&mut self) {
        self.index = 0;
    }
}

pub const DEFAULT_ALPHABET: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_-";

// Milliseconds before this instant are ignored to keep ids short.
const DEFAULT_REDUCE_TIME: u64 = 1_403_265_799_803;
const DEFAULT_VERSION: u64 = 6;

/// Short, non-sequential, collision-resistant ids.
///
/// Each id encodes the version, the worker, a per-second counter and the
/// seconds elapsed since the reduce time, one nibble per character of a
/// shuffled alphabet with two random bits mixed into every character.
/// The counter state is behind a mutex so a generator can be shared.
#[derive(Debug)]
pub struct ShortId {
    reduce_time: u64,
    version: u64,
    worker: u64,
    shuffled: OnceCell<Vec<char>>,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    previous_seconds: u64,
    counter: u64,
    entropy: Entropy,
}

impl ShortId {
    pub fn new() -> Self {
        Self::with_worker(0)
    }

    /// Generator for one of several cooperating workers
    pub fn with_worker(worker: u64) -> Self {
        ShortId {
            reduce_time: DEFAULT_REDUCE_TIME,
            version: DEFAULT_VERSION,
            worker,
            shuffled: OnceCell::new(),
            state: Mutex::new(State {
                previous_seconds: 0,
                counter: 0,
                entropy: Entropy::default(),
            }),
        }
    }

    pub fn generate(&self) -> String {
        let mut state = self.lock();
        let alphabet = self
            .shuffled
            .get_or_init(|| shuffle(DEFAULT_ALPHABET, &mut state.entropy));

        let seconds = self.elapsed_seconds();
        if seconds == state.previous_seconds {
            state.counter += 1;
        } else {
            state.counter = 0;
            state.previous_seconds = seconds;
        }
        let counter = state.counter;

        let mut id = String::new();
        id.push_str(&encode(self.version, alphabet, &mut state.entropy));
        id.push_str(&encode(self.worker, alphabet, &mut state.entropy));
        if counter > 0 {
            id.push_str(&encode(counter, alphabet, &mut state.entropy));
        }
        id.push_str(&encode(seconds, alphabet, &mut state.entropy));
        trace!("generated short id {id}");
        id
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn elapsed_seconds(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        now.saturating_sub(self.reduce_time) / 1000
    }
}

impl Default for ShortId {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(number: u64, alphabet: &[char], entropy: &mut Entropy) -> String {
    let mut out = String::new();
    let mut round = 0u32;
    loop {
        let nibble = ((number >> (4 * round)) & 0x0f) as usize;
        let index = nibble | (entropy.next_byte() & 0x30) as usize;
        out.push(alphabet[index]);
        round += 1;
        match 16u64.checked_pow(round) {
            Some(limit) if number >= limit => continue,
            _ => break,
        }
    }
    out
}

fn shuffle(alphabet: &str, entropy: &mut Entropy) -> Vec<char> {
    let mut source: Vec<char> = alphabet.chars().collect();
    let mut target = Vec::with_capacity(source.len());
    while !source.is_empty() {
        let index = (entropy.next_f64() * source.len() as f64).floor() as usize;
        target.push(source.remove(index.min(source.len() - 1)));
    }
    target
}

/// Random bytes drawn from v4 UUIDs, skipping their fixed version/variant bytes.
#[derive(Debug)]
struct Entropy {
    buffer: [u8; 16],
    position: usize,
}

impl Default for Entropy {
    fn default() -> Self {
        Entropy {
            buffer: [0; 16],
            position: 16,
        }
    }
}

impl Entropy {
    fn next_byte(&mut self) -> u8 {
        loop {
            if self.position >= self.buffer.len() {
                self.buffer = *Uuid::new_v4().as_bytes();
                self.position = 0;
            }
            let index = self.position;
            self.position += 1;
            if index != 6 && index != 8 {
                return self.buffer[index];
            }
        }
    }

    fn next_f64(&mut self) -> f64 {
        let mut bits = 0u64;
        for _ in 0..7 {
            bits = (bits << 8) | u64::from(self.next_byte());
        }
        (bits >> 3) as f64 / (1u64 << 53) as f64
    }
}
