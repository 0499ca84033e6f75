// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data loaded at startup when `SEED_DEMO_DATA` is set.
//!
//! Seeding is idempotent: accounts are matched by user name, contacts by
//! name and birth date, addresses by all postal fields. Only what is
//! missing gets written.

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Address, Contact, Role, User};
use crate::services::IdentityService;
use chrono::NaiveDate;

struct SeedUser {
    user_name: &'static str,
    password: &'static str,
    role: Role,
    contacts: &'static [SeedContact],
}

struct SeedContact {
    first_name: &'static str,
    last_name: &'static str,
    /// (year, month, day)
    born: (i32, u32, u32),
    addresses: &'static [SeedAddress],
}

struct SeedAddress(i32, &'static str, &'static str, &'static str);

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        user_name: "hlapointe",
        password: "Admin123!",
        role: Role::Administrator,
        contacts: &[
            SeedContact {
                first_name: "Sébastien",
                last_name: "Pouliot",
                born: (1980, 2, 6),
                addresses: &[
                    SeedAddress(3000, "Boulevard Boullé", "Saint-Hyacinthe", "J2S 1H9"),
                    SeedAddress(12, "Rue Girouard Ouest", "Saint-Hyacinthe", "J2S 2Y5"),
                ],
            },
            SeedContact {
                first_name: "Émile",
                last_name: "Bouchard",
                born: (1991, 9, 21),
                addresses: &[SeedAddress(401, "Rue des Cascades", "Saint-Hyacinthe", "J2S 3G7")],
            },
            SeedContact {
                first_name: "Camille",
                last_name: "Dion",
                born: (1988, 4, 13),
                addresses: &[
                    SeedAddress(77, "Avenue Sainte-Anne", "Saint-Hyacinthe", "J2S 5M1"),
                    SeedAddress(910, "Boulevard Laframboise", "Saint-Hyacinthe", "J2S 4W7"),
                    SeedAddress(8, "Rue Saint-Antoine", "Saint-Hyacinthe", "J2S 3K8"),
                ],
            },
            SeedContact {
                first_name: "Noah",
                last_name: "Tremblay",
                born: (1995, 11, 2),
                addresses: &[SeedAddress(255, "Rue Dessaulles", "Saint-Hyacinthe", "J2S 2T4")],
            },
        ],
    },
    SeedUser {
        user_name: "mbouchard",
        password: "User123!A",
        role: Role::User,
        contacts: &[
            SeedContact {
                first_name: "Léa",
                last_name: "Gauthier",
                born: (1992, 7, 17),
                addresses: &[
                    SeedAddress(18, "Rue Cartier", "Longueuil", "J4K 2V9"),
                    SeedAddress(245, "Chemin Chambly", "Longueuil", "J4H 3L4"),
                ],
            },
            SeedContact {
                first_name: "Thomas",
                last_name: "Paradis",
                born: (1987, 1, 28),
                addresses: &[SeedAddress(990, "Boulevard Curé-Poirier", "Longueuil", "J4J 4Y5")],
            },
            SeedContact {
                first_name: "Ariane",
                last_name: "Leduc",
                born: (1999, 3, 9),
                addresses: &[
                    SeedAddress(33, "Rue Saint-Charles", "Longueuil", "J4H 1C2"),
                    SeedAddress(120, "Rue Green", "Longueuil", "J4K 3N7"),
                ],
            },
            SeedContact {
                first_name: "Félix",
                last_name: "Cyr",
                born: (1990, 6, 12),
                addresses: &[SeedAddress(501, "Rue Joliette", "Longueuil", "J4H 2G9")],
            },
        ],
    },
    SeedUser {
        user_name: "jsimard",
        password: "User123!A",
        role: Role::User,
        contacts: &[
            SeedContact {
                first_name: "Élodie",
                last_name: "Martin",
                born: (1985, 12, 1),
                addresses: &[SeedAddress(74, "Rue Racine", "Québec", "G2B 1E3")],
            },
            SeedContact {
                first_name: "Gabriel",
                last_name: "Roy",
                born: (1993, 10, 18),
                addresses: &[
                    SeedAddress(415, "Boulevard René-Lévesque", "Québec", "G1R 2B6"),
                    SeedAddress(10, "Rue Saint-Jean", "Québec", "G1R 1N7"),
                ],
            },
            SeedContact {
                first_name: "Rosalie",
                last_name: "Dubé",
                born: (1997, 5, 24),
                addresses: &[
                    SeedAddress(208, "Avenue Cartier", "Québec", "G1R 2S8"),
                    SeedAddress(960, "Chemin Sainte-Foy", "Québec", "G1S 2L9"),
                ],
            },
            SeedContact {
                first_name: "Victor",
                last_name: "Nadeau",
                born: (1989, 8, 30),
                addresses: &[
                    SeedAddress(301, "Rue Saint-Paul", "Québec", "G1K 3W2"),
                    SeedAddress(44, "Rue Couillard", "Québec", "G1R 3T5"),
                    SeedAddress(777, "Boulevard Laurier", "Québec", "G1V 4M6"),
                ],
            },
        ],
    },
    SeedUser {
        user_name: "agrenier",
        password: "User123!A",
        role: Role::User,
        contacts: &[
            SeedContact {
                first_name: "Maude",
                last_name: "Pelletier",
                born: (1994, 2, 14),
                addresses: &[SeedAddress(55, "Rue Wellington", "Sherbrooke", "J1H 5E1")],
            },
            SeedContact {
                first_name: "Nathan",
                last_name: "Lavoie",
                born: (1986, 9, 5),
                addresses: &[
                    SeedAddress(622, "Boulevard Bourque", "Sherbrooke", "J1N 1H3"),
                    SeedAddress(9, "Rue King Ouest", "Sherbrooke", "J1H 1P1"),
                ],
            },
            SeedContact {
                first_name: "Clara",
                last_name: "Bernier",
                born: (1998, 4, 26),
                addresses: &[
                    SeedAddress(410, "Rue Belvédère Sud", "Sherbrooke", "J1H 4C7"),
                    SeedAddress(17, "Rue Marquette", "Sherbrooke", "J1H 1L5"),
                ],
            },
            SeedContact {
                first_name: "Julien",
                last_name: "Morin",
                born: (1991, 11, 19),
                addresses: &[SeedAddress(1001, "Boulevard de Portland", "Sherbrooke", "J1H 5H9")],
            },
        ],
    },
];

/// Records written by one [`seed_demo_data`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub contacts: usize,
    pub addresses: usize,
}

/// Bring the demo accounts, contacts and addresses up to date.
pub async fn seed_demo_data(db: &Db, identity: &IdentityService) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    let roles = identity.ensure_roles().await?;

    for seed in SEED_USERS {
        let role = roles
            .iter()
            .find(|record| record.name == seed.role)
            .ok_or_else(|| AppError::NotFound("Role not found.".to_string()))?;

        let user = match db.find_user_by_name(seed.user_name).await? {
            Some(user) => user,
            None => {
                summary.users += 1;
                identity
                    .create_user(seed.user_name, seed.password, role)
                    .await?
            }
        };
        let user = ensure_role(db, user, seed.role).await?;

        ensure_contacts(db, &user, seed.contacts, &mut summary).await?;
    }

    tracing::info!(
        users = summary.users,
        contacts = summary.contacts,
        addresses = summary.addresses,
        "Demo data seeded"
    );
    Ok(summary)
}

async fn ensure_role(db: &Db, mut user: User, role: Role) -> Result<User> {
    if user.role != role {
        tracing::info!(user_id = %user.id, from = %user.role, to = %role, "Restoring seed role");
        user.role = role;
        user.rotate_security_stamp();
        db.update_user(&user).await?;
    }
    Ok(user)
}

async fn ensure_contacts(
    db: &Db,
    owner: &User,
    contacts: &[SeedContact],
    summary: &mut SeedSummary,
) -> Result<()> {
    let existing = db.list_contacts_for_owner(owner.id).await?;

    for seed in contacts {
        let (year, month, day) = seed.born;
        let date_of_birth = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Invalid seed birth date {:?}", seed.born))
        })?;

        let found = existing.iter().find(|contact| {
            contact.first_name == seed.first_name
                && contact.last_name == seed.last_name
                && contact.date_of_birth == date_of_birth
        });

        let Some(contact) = found else {
            let contact = Contact::create_for_owner(
                owner.id,
                seed.first_name,
                seed.last_name,
                date_of_birth,
            )?;
            let addresses = seed
                .addresses
                .iter()
                .map(|a| Address::create(contact.id, a.0, a.1, a.2, a.3))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            db.insert_contact(&contact, &addresses).await?;
            summary.contacts += 1;
            summary.addresses += addresses.len();
            continue;
        };

        let stored = db.list_addresses_for_contact(contact.id).await?;
        for a in seed.addresses {
            if stored.iter().any(|s| s.same_location(a.0, a.1, a.2, a.3)) {
                continue;
            }
            let address = Address::create(contact.id, a.0, a.1, a.2, a.3)?;
            db.save_address(&address).await?;
            summary.addresses += 1;
        }
    }

    Ok(())
}
