//! Domain layer - Plugin model and the collaborator abstractions
//! 
//! This layer contains:
//! - Entities: Plugin descriptions and loaded plugin units
//! - Traits: Plugin hooks, discovery and registry abstractions

pub mod entities;
pub mod traits;
