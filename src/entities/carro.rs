//! Carro entity type - vehicles in the dealership inventory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};

/// Transmission type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transmision {
    Manual,
    Automatica,
    Semiautomatica,
}

impl Default for Transmision {
    fn default() -> Self {
        Transmision::Manual
    }
}

impl std::fmt::Display for Transmision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transmision::Manual => write!(f, "manual"),
            Transmision::Automatica => write!(f, "automatica"),
            Transmision::Semiautomatica => write!(f, "semiautomatica"),
        }
    }
}

impl std::str::FromStr for Transmision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Transmision::Manual),
            "automatica" | "automática" => Ok(Transmision::Automatica),
            "semiautomatica" | "semiautomática" => Ok(Transmision::Semiautomatica),
            _ => Err(format!(
                "invalid transmission: {}. Use manual, automatica, or semiautomatica",
                s
            )),
        }
    }
}

/// Fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combustible {
    Gasolina,
    Diesel,
    Electrico,
    Hibrido,
}

impl Default for Combustible {
    fn default() -> Self {
        Combustible::Gasolina
    }
}

impl std::fmt::Display for Combustible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Combustible::Gasolina => write!(f, "gasolina"),
            Combustible::Diesel => write!(f, "diesel"),
            Combustible::Electrico => write!(f, "electrico"),
            Combustible::Hibrido => write!(f, "hibrido"),
        }
    }
}

impl std::str::FromStr for Combustible {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gasolina" => Ok(Combustible::Gasolina),
            "diesel" | "diésel" => Ok(Combustible::Diesel),
            "electrico" | "eléctrico" => Ok(Combustible::Electrico),
            "hibrido" | "híbrido" => Ok(Combustible::Hibrido),
            _ => Err(format!(
                "invalid fuel type: {}. Use gasolina, diesel, electrico, or hibrido",
                s
            )),
        }
    }
}

/// Vehicle condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condicion {
    Nuevo,
    Usado,
    Reacondicionado,
}

impl Default for Condicion {
    fn default() -> Self {
        Condicion::Usado
    }
}

impl std::fmt::Display for Condicion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condicion::Nuevo => write!(f, "nuevo"),
            Condicion::Usado => write!(f, "usado"),
            Condicion::Reacondicionado => write!(f, "reacondicionado"),
        }
    }
}

impl std::str::FromStr for Condicion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nuevo" => Ok(Condicion::Nuevo),
            "usado" => Ok(Condicion::Usado),
            "reacondicionado" => Ok(Condicion::Reacondicionado),
            _ => Err(format!(
                "invalid condition: {}. Use nuevo, usado, or reacondicionado",
                s
            )),
        }
    }
}

/// A vehicle in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carro {
    pub id: EntityId,

    pub marca: String,
    pub modelo: String,
    pub anio: i32,
    pub precio: f64,

    #[serde(default)]
    pub kilometraje: u32,

    #[serde(default)]
    pub transmision: Transmision,

    #[serde(default)]
    pub combustible: Combustible,

    #[serde(default)]
    pub condicion: Condicion,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,

    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,

    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Carro {
    pub fn new(
        marca: String,
        modelo: String,
        anio: i32,
        precio: f64,
        transmision: Transmision,
        combustible: Combustible,
        condicion: Condicion,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Car),
            marca,
            modelo,
            anio,
            precio,
            kilometraje: 0,
            transmision,
            combustible,
            condicion,
            descripcion: None,
            fecha_creacion: now,
            fecha_actualizacion: now,
            entity_revision: 1,
        }
    }
}

impl Entity for Carro {
    const PREFIX: EntityPrefix = EntityPrefix::Car;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn summary(&self) -> String {
        format!("{} {} {}", self.marca, self.modelo, self.anio)
    }

    fn created(&self) -> DateTime<Utc> {
        self.fecha_creacion
    }

    fn revision(&self) -> u32 {
        self.entity_revision
    }

    fn set_revision(&mut self, revision: u32) {
        self.entity_revision = revision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carro_creation() {
        let car = Carro::new(
            "Nissan".to_string(),
            "Versa".to_string(),
            2023,
            16000.0,
            Transmision::Manual,
            Combustible::Gasolina,
            Condicion::Nuevo,
        );

        assert!(car.id.to_string().starts_with("CAR-"));
        assert_eq!(car.kilometraje, 0);
        assert_eq!(car.summary(), "Nissan Versa 2023");
    }

    #[test]
    fn test_carro_yaml_roundtrip() {
        let car = Carro::new(
            "Kia".to_string(),
            "Rio".to_string(),
            2020,
            12500.0,
            Transmision::Automatica,
            Combustible::Hibrido,
            Condicion::Usado,
        );

        let yaml = serde_yml::to_string(&car).unwrap();
        assert!(yaml.contains("combustible: hibrido"));

        let parsed: Carro = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, car.id);
        assert_eq!(parsed.combustible, Combustible::Hibrido);
    }

    #[test]
    fn test_enum_parsing_accepts_accents() {
        assert_eq!(
            "automática".parse::<Transmision>().unwrap(),
            Transmision::Automatica
        );
        assert_eq!(
            "eléctrico".parse::<Combustible>().unwrap(),
            Combustible::Electrico
        );
        assert!("volador".parse::<Condicion>().is_err());
    }
}
