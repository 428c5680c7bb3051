use crate::{shuffle, DrawRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Receiver draws tried before falling back to a rotation of the givers.
pub const DERANGEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub giver: String,
    pub receiver: String,
}

impl Pairing {
    pub fn new(giver: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            giver: giver.into(),
            receiver: receiver.into(),
        }
    }
}

pub fn pick_single<R: DrawRng + ?Sized>(list: &[String], rng: &mut R) -> Option<String> {
    shuffle(list, rng).into_iter().next()
}

pub fn pick_n<R: DrawRng + ?Sized>(list: &[String], count: usize, rng: &mut R) -> Vec<String> {
    let mut shuffled = shuffle(list, rng);
    shuffled.truncate(count.min(list.len()));
    shuffled
}

pub fn full_shuffle<R: DrawRng + ?Sized>(list: &[String], rng: &mut R) -> Vec<String> {
    shuffle(list, rng)
}

/// Gift-exchange pairing where nobody draws their own name.
///
/// Fewer than two names cannot be deranged and yield an empty pairing. When
/// every attempt leaves a fixed point, each giver hands to the next giver in
/// the shuffled order instead.
pub fn derangement_pairing<R: DrawRng + ?Sized>(names: &[String], rng: &mut R) -> Vec<Pairing> {
    if names.len() < 2 {
        return Vec::new();
    }
    let givers = shuffle(names, rng);
    let receivers = (0..DERANGEMENT_ATTEMPTS)
        .map(|_| shuffle(names, rng))
        .find(|receivers| !has_fixed_point(&givers, receivers))
        .unwrap_or_else(|| {
            debug!(names = names.len(), "derangement budget exhausted, rotating givers");
            rotate_by_one(&givers)
        });
    givers
        .into_iter()
        .zip(receivers)
        .map(|(giver, receiver)| Pairing { giver, receiver })
        .collect()
}

fn has_fixed_point(givers: &[String], receivers: &[String]) -> bool {
    givers
        .iter()
        .zip(receivers)
        .any(|(giver, receiver)| giver == receiver)
}

fn rotate_by_one(items: &[String]) -> Vec<String> {
    let mut rotated = items.to_vec();
    rotated.rotate_left(1);
    rotated
}

/// Stretch `prizes` to exactly `count` entries: repeat the list until it is
/// long enough, shuffle, then cut.
pub fn normalize_prizes<R: DrawRng + ?Sized>(
    prizes: &[String],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    if prizes.is_empty() {
        return Vec::new();
    }
    let mut extended = prizes.to_vec();
    while extended.len() < count {
        extended.extend_from_slice(prizes);
    }
    let mut shuffled = shuffle(&extended, rng);
    shuffled.truncate(count);
    shuffled
}

/// Ladder result without a board: normalized prizes zipped with the people in
/// their given order.
pub fn prize_pairing<R: DrawRng + ?Sized>(
    people: &[String],
    prizes: &[String],
    rng: &mut R,
) -> Vec<Pairing> {
    if people.is_empty() || prizes.is_empty() {
        return Vec::new();
    }
    let assigned = normalize_prizes(prizes, people.len(), rng);
    people
        .iter()
        .cloned()
        .zip(assigned)
        .map(|(giver, receiver)| Pairing { giver, receiver })
        .collect()
}
