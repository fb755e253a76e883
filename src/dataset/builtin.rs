//! Landmark points that are always available, even without an
//! `infraestrutura.json` in the data directory.

use crate::models::{Address, EntityKind, GeoPoint, LocatedEntity};

struct Landmark {
    kind: EntityKind,
    category: &'static str,
    name: &'static str,
    point: GeoPoint,
    address: &'static str,
}

const LANDMARKS: &[Landmark] = &[
    Landmark {
        kind: EntityKind::Hospital,
        category: "SAUDE",
        name: "Hospital João XXIII (Trauma)",
        point: GeoPoint::new(-19.927179, -43.932235),
        address: "Av. Alfredo Balena, 400",
    },
    Landmark {
        kind: EntityKind::Hospital,
        category: "SAUDE",
        name: "UPA Centro-Sul",
        point: GeoPoint::new(-19.922, -43.926),
        address: "Rua Domingos Vieira, 488",
    },
    Landmark {
        kind: EntityKind::Hospital,
        category: "SAUDE",
        name: "Hospital Odilon Behrens",
        point: GeoPoint::new(-19.9048, -43.9482),
        address: "R. Formiga, 50",
    },
    Landmark {
        kind: EntityKind::Infrastructure,
        category: "POLICIA",
        name: "Delegacia Centro (1ª DEPPC)",
        point: GeoPoint::new(-19.9245, -43.935),
        address: "Av. Afonso Pena, 984",
    },
    Landmark {
        kind: EntityKind::Infrastructure,
        category: "POLICIA",
        name: "Batalhão Rotam",
        point: GeoPoint::new(-19.9078, -43.9628),
        address: "Av. Pres. Antônio Carlos",
    },
    Landmark {
        kind: EntityKind::Restroom,
        category: "BANHEIRO",
        name: "Shopping Cidade",
        point: GeoPoint::new(-19.9208, -43.9388),
        address: "Rua Tupis, 337",
    },
    Landmark {
        kind: EntityKind::Restroom,
        category: "BANHEIRO",
        name: "Pátio Savassi",
        point: GeoPoint::new(-19.9402, -43.9339),
        address: "Av. do Contorno, 6061",
    },
    Landmark {
        kind: EntityKind::Restroom,
        category: "BANHEIRO",
        name: "Mercado Central",
        point: GeoPoint::new(-19.9234, -43.9419),
        address: "Av. Augusto de Lima, 744",
    },
    Landmark {
        kind: EntityKind::TransitStation,
        category: "METRO",
        name: "Estação Central",
        point: GeoPoint::new(-19.9175, -43.9332),
        address: "Praça da Estação",
    },
    Landmark {
        kind: EntityKind::TransitStation,
        category: "METRO",
        name: "Estação Lagoinha",
        point: GeoPoint::new(-19.9135, -43.946),
        address: "Rodoviária",
    },
];

/// Splits "Street, 123" into street and number.
fn split_address(raw: &str) -> Address {
    let (street, number) = match raw.rsplit_once(',') {
        Some((street, number)) => (street.trim(), Some(number.trim().to_string())),
        None => (raw.trim(), None),
    };
    Address {
        street: Some(street.to_string()),
        number,
        ..Address::default()
    }
}

pub fn infrastructure() -> Vec<LocatedEntity> {
    LANDMARKS
        .iter()
        .map(|l| LocatedEntity {
            name: l.name.to_string(),
            kind: l.kind,
            category: l.category.to_string(),
            address: split_address(l.address),
            location: Some(l.point),
            capacity: None,
            available_from: None,
            available_until: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmarks_all_located() {
        let points = infrastructure();
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| p.location.is_some_and(|l| l.is_known())));
    }

    #[test]
    fn test_landmark_address_split() {
        let points = infrastructure();
        let upa = points.iter().find(|p| p.name == "UPA Centro-Sul").unwrap();
        assert_eq!(upa.address.formatted().as_deref(), Some("Rua Domingos Vieira, 488"));

        let rotam = points.iter().find(|p| p.name == "Batalhão Rotam").unwrap();
        assert_eq!(rotam.address.formatted().as_deref(), Some("Av. Pres. Antônio Carlos, S/N"));
    }
}
