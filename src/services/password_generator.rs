// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random passwords for accounts created or reset by an administrator.

use rand::seq::{IndexedRandom, SliceRandom};

const LOWERCASES: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASES: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIALS: &[u8] = b"!@#$%&*";

const LENGTH_MIN: usize = 10;
const LOWERCASE_MIN: usize = 1;
const UPPERCASE_MIN: usize = 1;
const DIGITS_MIN: usize = 1;
const SPECIAL_MIN: usize = 1;

/// Generate a password with at least one lowercase letter, one uppercase
/// letter, one digit and one special character.
pub fn generate() -> String {
    let mut rng = rand::rng();
    let mut password: Vec<u8> = Vec::with_capacity(LENGTH_MIN);

    let required = [
        (LOWERCASES, LOWERCASE_MIN),
        (UPPERCASES, UPPERCASE_MIN),
        (DIGITS, DIGITS_MIN),
        (SPECIALS, SPECIAL_MIN),
    ];
    for (charset, count) in required {
        password.extend(charset.choose_multiple(&mut rng, count).copied());
    }

    while password.len() < LENGTH_MIN {
        if let Some(&c) = LOWERCASES.choose(&mut rng) {
            password.push(c);
        }
    }

    // Required classes would otherwise always lead.
    password.shuffle(&mut rng);
    password.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules;

    #[test]
    fn test_generated_password_satisfies_rules() {
        for _ in 0..200 {
            let password = generate();
            assert_eq!(password.len(), LENGTH_MIN);
            assert!(rules::password(&password).is_ok(), "rejected: {password}");
            assert!(password.chars().any(|c| SPECIALS.contains(&(c as u8))));
        }
    }

    #[test]
    fn test_generated_passwords_differ() {
        assert_ne!(generate(), generate());
    }
}
