//! Deterministic deal inputs.
//!
//! A deal is an ordered 52-card deck consumed by `Board::deal`. Decks come
//! from three sources:
//!
//!   - explicit `(suit index, rank value)` pairs, e.g. test fixtures or a
//!     JSON file `[[3, 11], [2, 11], ...]`;
//!   - a seeded shuffle (PCG64), reproducible across runs and platforms;
//!   - a *deal number*: the position of the deck in the lexicographic order
//!     of all 52! permutations, written in factorial base. Deal number 0 is
//!     the unshuffled `standard_deck()`.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg64;

use crate::board::{Deck, DECK_LEN};
use crate::card::{standard_deck, Card};
use crate::error::{Error, Result};

/// Build a deck from `(suit index 0-3, rank value 1-13)` pairs, checking
/// that they form a permutation of the 52 cards.
pub fn deck_from_pairs(pairs: &[(u8, u8)]) -> Result<Deck> {
    if pairs.len() != DECK_LEN {
        return Err(Error::InvalidDeal(format!(
            "expected {} cards, got {}",
            DECK_LEN,
            pairs.len()
        )));
    }

    let mut deck = standard_deck();
    let mut seen = [false; DECK_LEN];
    for (i, &(suit, rank)) in pairs.iter().enumerate() {
        let card = Card::from_pair(suit, rank).ok_or_else(|| {
            Error::InvalidDeal(format!("entry {}: no card ({}, {})", i, suit, rank))
        })?;
        let slot = &mut seen[card.index() as usize];
        if *slot {
            return Err(Error::InvalidDeal(format!("entry {}: {} dealt twice", i, card)));
        }
        *slot = true;
        deck[i] = card;
    }
    Ok(deck)
}

/// Parse a JSON array of `[suit, rank]` pairs into a deck.
pub fn parse_pairs_json(text: &str) -> Result<Deck> {
    let pairs: Vec<(u8, u8)> =
        serde_json::from_str(text).map_err(|e| Error::InvalidDeal(format!("bad JSON: {e}")))?;
    deck_from_pairs(&pairs)
}

/// A shuffled deck, fully determined by `seed`.
pub fn shuffled_deck(seed: u64) -> Deck {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut deck = standard_deck();
    deck.shuffle(&mut rng);
    deck
}

// ----- Deal numbers -----

/// 52!, one past the largest deal number.
pub fn deal_count() -> BigUint {
    (1..=DECK_LEN as u32).map(BigUint::from).product()
}

/// The deal number of `deck`.
///
/// Digit `i` (radix `52 - i`) is the position of `deck[i]` among the cards
/// not yet dealt, taken in standard order.
pub fn deal_number(deck: &Deck) -> BigUint {
    let mut remaining: Vec<Card> = standard_deck().to_vec();
    let mut n = BigUint::zero();
    for (i, card) in deck.iter().enumerate() {
        let digit = remaining.iter().position(|c| c == card).unwrap_or(0);
        remaining.remove(digit);
        n = n * BigUint::from(DECK_LEN - i) + BigUint::from(digit);
    }
    n
}

/// The deck with deal number `n`.
pub fn deck_from_deal_number(n: &BigUint) -> Result<Deck> {
    if *n >= deal_count() {
        return Err(Error::InvalidDeal(format!("deal number {} is not below 52!", n)));
    }

    let mut digits = [0usize; DECK_LEN];
    let mut rest = n.clone();
    for i in (0..DECK_LEN).rev() {
        let radix = BigUint::from(DECK_LEN - i);
        digits[i] = (&rest % &radix).to_usize().unwrap_or(0);
        rest /= radix;
    }
    debug_assert!(rest.is_zero());

    let mut remaining: Vec<Card> = standard_deck().to_vec();
    let mut deck = standard_deck();
    for (slot, &digit) in deck.iter_mut().zip(digits.iter()) {
        *slot = remaining.remove(digit);
    }
    Ok(deck)
}

/// Parse a decimal deal number. Whitespace, `_` and `,` are ignored so
/// that grouped numbers can be pasted directly.
pub fn parse_deal_number(s: &str) -> Result<BigUint> {
    let cleaned: String = s
        .chars()
        .filter(|c| !(c.is_whitespace() || *c == '_' || *c == ','))
        .collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidDeal(format!("not a deal number: {:?}", s)));
    }
    BigUint::parse_bytes(cleaned.as_bytes(), 10)
        .ok_or_else(|| Error::InvalidDeal(format!("not a deal number: {:?}", s)))
}

// ----- Fixtures -----

/// First fixed permutation, dealt column by column.
pub const GAME_ONE: [(u8, u8); DECK_LEN] = [
    (3, 11), (2, 11), (3, 4), (1, 7), (2, 7), (1, 11), (3, 8), (1, 4), (0, 8), (0, 7),
    (2, 13), (1, 13), (1, 6), (0, 1), (0, 9), (2, 1), (3, 12), (1, 8), (1, 2), (1, 1),
    (3, 3), (2, 5), (0, 10), (3, 1), (1, 12), (0, 2), (2, 3), (1, 5), (3, 6), (2, 12),
    (1, 3), (2, 9), (3, 5), (3, 9), (1, 9), (2, 6), (0, 6), (0, 3), (2, 8), (3, 7),
    (0, 12), (3, 10), (0, 4), (3, 13), (0, 11), (0, 5), (2, 10), (0, 13), (2, 4), (3, 2),
    (2, 2), (1, 10),
];

/// Second fixed permutation.
pub const GAME_TWO: [(u8, u8); DECK_LEN] = [
    (3, 10), (0, 1), (0, 10), (2, 2), (0, 9), (1, 8), (1, 2), (1, 13), (3, 5), (2, 5),
    (0, 6), (2, 10), (2, 6), (1, 5), (3, 1), (0, 11), (1, 9), (1, 3), (0, 13), (0, 12),
    (0, 2), (1, 12), (2, 11), (0, 5), (3, 9), (2, 12), (1, 4), (3, 12), (3, 7), (1, 10),
    (2, 7), (2, 1), (1, 11), (0, 7), (2, 3), (3, 11), (0, 3), (3, 13), (3, 2), (2, 8),
    (1, 7), (3, 8), (3, 3), (2, 4), (0, 4), (3, 6), (2, 13), (1, 6), (1, 1), (3, 4),
    (0, 8), (2, 9),
];

/// Look up a fixture by name (`game-one`, `game-two`).
pub fn fixture(name: &str) -> Option<&'static [(u8, u8); DECK_LEN]> {
    match name.trim().to_ascii_lowercase().as_str() {
        "game-one" | "one" | "1" => Some(&GAME_ONE),
        "game-two" | "two" | "2" => Some(&GAME_TWO),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    #[test]
    fn fixtures_are_permutations() {
        for pairs in [&GAME_ONE, &GAME_TWO] {
            let deck = deck_from_pairs(pairs).unwrap();
            assert_eq!(deck.len(), DECK_LEN);
        }
        let deck = deck_from_pairs(&GAME_ONE).unwrap();
        assert_eq!(deck[0], Card::new(Suit::Diamonds, Rank::Jack));
        assert_eq!(deck[13], Card::new(Suit::Spades, Rank::Ace));
    }

    #[test]
    fn pairs_reject_duplicates_bad_values_and_short_lists() {
        let mut pairs = GAME_ONE;
        pairs[1] = pairs[0];
        assert!(matches!(deck_from_pairs(&pairs), Err(Error::InvalidDeal(_))));

        let mut pairs = GAME_ONE;
        pairs[0] = (4, 1);
        assert!(matches!(deck_from_pairs(&pairs), Err(Error::InvalidDeal(_))));

        let mut pairs = GAME_ONE;
        pairs[0] = (0, 0);
        assert!(matches!(deck_from_pairs(&pairs), Err(Error::InvalidDeal(_))));

        assert!(deck_from_pairs(&GAME_ONE[..51]).is_err());
    }

    #[test]
    fn json_pairs_parse() {
        let text = serde_json::to_string(&GAME_TWO.to_vec()).unwrap();
        assert_eq!(parse_pairs_json(&text).unwrap(), deck_from_pairs(&GAME_TWO).unwrap());
        assert!(parse_pairs_json("[[0, 1]").is_err());
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        assert_eq!(shuffled_deck(7), shuffled_deck(7));
        assert_ne!(shuffled_deck(7), shuffled_deck(8));

        let mut sorted = shuffled_deck(7).to_vec();
        sorted.sort();
        assert_eq!(sorted, standard_deck().to_vec());
    }

    #[test]
    fn deal_number_zero_is_standard_order() {
        let zero = BigUint::zero();
        assert_eq!(deal_number(&standard_deck()), zero);
        assert_eq!(deck_from_deal_number(&zero).unwrap(), standard_deck());
    }

    #[test]
    fn deal_numbers_identify_decks() {
        for seed in 0..5u64 {
            let deck = shuffled_deck(seed);
            let n = deal_number(&deck);
            assert!(n < deal_count());
            assert_eq!(deck_from_deal_number(&n).unwrap(), deck);
        }

        // Swapping the last two cards is deal number 1.
        let mut deck = standard_deck();
        deck.swap(DECK_LEN - 2, DECK_LEN - 1);
        assert_eq!(deal_number(&deck), BigUint::from(1u32));

        // Fully reversed order is the last deal.
        let mut reversed = standard_deck();
        reversed.reverse();
        assert_eq!(deal_number(&reversed), deal_count() - 1u32);
    }

    #[test]
    fn deal_number_parsing() {
        assert_eq!(parse_deal_number(" 1_000,000 ").unwrap(), BigUint::from(1_000_000u32));
        assert!(parse_deal_number("").is_err());
        assert!(parse_deal_number("12a").is_err());
        assert!(deck_from_deal_number(&deal_count()).is_err());
    }

    #[test]
    fn fixture_lookup() {
        assert_eq!(fixture("Game-One"), Some(&GAME_ONE));
        assert_eq!(fixture("2"), Some(&GAME_TWO));
        assert_eq!(fixture("three"), None);
    }
}
