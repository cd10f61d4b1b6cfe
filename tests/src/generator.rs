//! Seeded recipe mutation generator.

use brewline_core::{fields, RecordId, Value};
use brewline_session::{DrinkType, Session};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One generated mutation and whether it committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Create { id: RecordId, drink: DrinkType },
    Update { id: RecordId, drink: DrinkType },
    Retitle { id: RecordId },
    Delete { id: RecordId },
    /// A create the engine must reject.
    Rejected,
}

/// Drives random recipe mutations through a session.
pub struct MutationGenerator {
    rng: StdRng,
    authors: Vec<RecordId>,
    recipes: Vec<RecordId>,
}

impl MutationGenerator {
    pub fn new(seed: u64, authors: Vec<RecordId>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            authors,
            recipes: Vec::new(),
        }
    }

    /// Recipes created by this generator and not yet deleted.
    pub fn recipes(&self) -> &[RecordId] {
        &self.recipes
    }

    /// Generate and apply one mutation.
    pub fn step(&mut self, session: &Session<'_>) -> Step {
        let roll = self.rng.gen_range(0..100);
        if self.recipes.is_empty() || roll < 35 {
            return self.create(session);
        }

        let index = self.rng.gen_range(0..self.recipes.len());
        let id = self.recipes[index].clone();
        match roll {
            35..=64 => {
                let drink = self.drink();
                expect_ok(session.update("Recipe", &id, fields! { "drinkType" => drink }));
                Step::Update { id, drink }
            }
            65..=79 => {
                let title = format!("Recipe #{}", self.rng.gen_range(0..1000));
                expect_ok(session.update("Recipe", &id, fields! { "title" => title }));
                Step::Retitle { id }
            }
            80..=94 => {
                expect_ok(session.delete("Recipe", &id));
                self.recipes.swap_remove(index);
                Step::Delete { id }
            }
            _ => {
                let result = session.create("Recipe", fields! { "drinkType" => "Frappuccino" });
                assert!(result.is_err(), "unknown drink type was accepted");
                Step::Rejected
            }
        }
    }

    /// Generate and apply `count` mutations.
    pub fn run(&mut self, session: &Session<'_>, count: usize) -> Vec<Step> {
        (0..count).map(|_| self.step(session)).collect()
    }

    fn create(&mut self, session: &Session<'_>) -> Step {
        let drink = self.drink();
        let mut fields = fields! { "drinkType" => drink, "title" => "Untitled" };
        if !self.authors.is_empty() {
            let author = &self.authors[self.rng.gen_range(0..self.authors.len())];
            fields.insert("userId".to_string(), Value::from(author));
        }
        let record = expect_ok(session.create("Recipe", fields));
        self.recipes.push(record.id.clone());
        Step::Create {
            id: record.id,
            drink,
        }
    }

    fn drink(&mut self) -> DrinkType {
        DrinkType::ALL[self.rng.gen_range(0..DrinkType::ALL.len())]
    }
}

fn expect_ok<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("generated mutation failed: {}", e),
    }
}
