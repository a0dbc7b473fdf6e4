/// Flat entity list plus per-tick world scripts
use std::fmt;
use std::time::Duration;

use crate::entity::Entity;

/// Runs once per update with mutable access to every entity and the tick length
pub type WorldScript = Box<dyn FnMut(&mut [Entity], Duration)>;

#[derive(Default)]
pub struct Scene {
    entities: Vec<Entity>,
    scripts: Vec<WorldScript>,
    elapsed: Duration,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entity's index
    pub fn add_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn add_script<F>(&mut self, script: F)
    where
        F: FnMut(&mut [Entity], Duration) + 'static,
    {
        self.scripts.push(Box::new(script));
    }

    /// Run world scripts in registration order
    pub fn update(&mut self, dt: Duration) {
        self.elapsed += dt;
        for script in &mut self.scripts {
            script(self.entities.as_mut_slice(), dt);
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Total simulated time passed to [`Scene::update`]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.entities)
            .field("scripts", &self.scripts.len())
            .field("elapsed", &self.elapsed)
            .finish()
    }
}
