//! Seed data written on first start.
//!
//! A fresh store gets two accounts (one regular user, one administrator) and a
//! handful of complaints owned by the regular user so the dashboards have
//! something to show.

use chrono::{DateTime, TimeZone, Utc};

use super::accounts::Account;
use super::complaint::{Complaint, ComplaintId, ComplaintStatus, NewComplaint, Priority};
use super::ports::{HashingError, PasswordHasher};
use super::{Password, Role, User, UserId};

struct SeedAccount {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    role: Role,
    password: &'static str,
}

const SEED_ACCOUNTS: [SeedAccount; 2] = [
    SeedAccount {
        id: "user-1",
        name: "Manish Kumar",
        email: "manish@example.com",
        role: Role::User,
        password: "password123",
    },
    SeedAccount {
        id: "admin-1",
        name: "Admin User",
        email: "admin@example.com",
        role: Role::Admin,
        password: "admin123",
    },
];

struct SeedComplaint {
    number: u32,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    priority: Priority,
    path: &'static [ComplaintStatus],
    filed: (u32, u32),
}

const SEED_COMPLAINTS: [SeedComplaint; 3] = [
    SeedComplaint {
        number: 1,
        title: "Streetlight not working",
        description: "The streetlight outside block C has been off for over a week.",
        category: "Infrastructure",
        priority: Priority::High,
        path: &[],
        filed: (1, 9),
    },
    SeedComplaint {
        number: 2,
        title: "Irregular garbage collection",
        description: "Bins on the east lane were skipped twice this month.",
        category: "Sanitation",
        priority: Priority::Medium,
        path: &[ComplaintStatus::InProgress],
        filed: (3, 14),
    },
    SeedComplaint {
        number: 3,
        title: "Water leakage in basement parking",
        description: "A pipe near pillar 14 leaks whenever it rains.",
        category: "Maintenance",
        priority: Priority::Low,
        path: &[ComplaintStatus::InProgress, ComplaintStatus::Resolved],
        filed: (5, 11),
    },
];

fn seed_time(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn seed_user(seed: &SeedAccount) -> Option<User> {
    User::try_from_strings(seed.id, seed.name, seed.email, seed.role).ok()
}

/// Seed accounts with freshly hashed passwords.
pub fn default_accounts(hasher: &dyn PasswordHasher) -> Result<Vec<Account>, HashingError> {
    SEED_ACCOUNTS
        .iter()
        .filter_map(|seed| Some((seed_user(seed)?, seed.password)))
        .map(|(user, password)| {
            let password = Password::new(password)
                .map_err(|err| HashingError::hash(err.to_string()))?;
            Ok(Account::new(user, hasher.hash(&password)?))
        })
        .collect()
}

/// Seed complaints, owned by the default user and handled by the default
/// administrator.
pub fn default_complaints() -> Vec<Complaint> {
    let mut seeds = SEED_ACCOUNTS.iter().filter_map(seed_user);
    let (Some(owner), Some(admin)) = (seeds.next(), seeds.next()) else {
        return Vec::new();
    };
    SEED_COMPLAINTS
        .iter()
        .filter_map(|seed| seed_complaint(seed, &owner, admin.id()))
        .collect()
}

fn seed_complaint(seed: &SeedComplaint, owner: &User, admin: &UserId) -> Option<Complaint> {
    let input =
        NewComplaint::try_from_parts(seed.title, seed.description, seed.category, Some(seed.priority))
            .ok()?;
    let (day, hour) = seed.filed;
    let mut complaint = Complaint::file(
        ComplaintId::from_number(seed.number),
        input,
        owner.id().clone(),
        owner.name().clone(),
        seed_time(day, hour),
    );
    for (step, status) in (1..).zip(seed.path) {
        complaint.transition(*status, admin.clone(), None, seed_time(day + step, hour));
    }
    Some(complaint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FixturePasswordHasher;

    #[test]
    fn seeds_one_user_and_one_admin() {
        let accounts = default_accounts(&FixturePasswordHasher).expect("hash seeds");
        let roles: Vec<_> = accounts.iter().map(|account| account.role()).collect();
        assert_eq!(roles, [Role::User, Role::Admin]);
        assert_eq!(accounts[0].email().as_ref(), "manish@example.com");
        assert_ne!(accounts[0].password_hash().as_str(), "password123");
    }

    #[test]
    fn seed_complaints_have_consistent_history() {
        let complaints = default_complaints();
        assert_eq!(complaints.len(), SEED_COMPLAINTS.len());
        for complaint in &complaints {
            assert_eq!(complaint.owner_id().as_ref(), "user-1");
            let expected = complaint
                .history()
                .last()
                .map_or(ComplaintStatus::Submitted, |change| change.to);
            assert_eq!(complaint.status(), expected);
            assert!(complaint.updated_at() >= complaint.created_at());
        }
        let ids: Vec<_> = complaints.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, ["CMP-001", "CMP-002", "CMP-003"]);
    }
}
