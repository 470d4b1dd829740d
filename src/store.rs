//! Owner-scoped record operations over [`AppData`].
//!
//! Every lookup takes the caller's user id; a record owned by someone else
//! is reported exactly like a missing one.

use crate::errors::StoreError;
use crate::models::{AppData, Stat, StatItem, StatItemRequest, StatRequest, StatWithItems, User};
use crate::stats::DateRange;
use crate::validation::NewUser;
use chrono::Utc;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn find_user_by_email<'a>(data: &'a AppData, email: &str) -> Option<&'a User> {
    data.users.values().find(|user| user.email == email)
}

pub fn register_user(
    data: &mut AppData,
    new_user: NewUser,
    password_hash: String,
) -> Result<User, StoreError> {
    if find_user_by_email(data, &new_user.email).is_some() {
        return Err(StoreError::Conflict("User already exists".into()));
    }

    let user = User {
        id: new_id(),
        username: new_user.username,
        email: new_user.email,
        password_hash,
        created_at: Utc::now(),
    };
    data.users.insert(user.id.clone(), user.clone());
    Ok(user)
}

pub fn user<'a>(data: &'a AppData, user_id: &str) -> Result<&'a User, StoreError> {
    data.users.get(user_id).ok_or(StoreError::NotFound("user"))
}

pub fn rename_user(data: &mut AppData, user_id: &str, username: String) -> Result<User, StoreError> {
    let user = data
        .users
        .get_mut(user_id)
        .ok_or(StoreError::NotFound("user"))?;
    user.username = username;
    Ok(user.clone())
}

pub fn create_stat(data: &mut AppData, user_id: &str, req: StatRequest) -> Result<Stat, StoreError> {
    user(data, user_id)?;
    let stat = Stat {
        id: new_id(),
        user_id: user_id.to_string(),
        name: req.name,
        description: req.description,
        measurement_label: req.measurement_label,
        created_at: Utc::now(),
    };
    data.stats.insert(stat.id.clone(), stat.clone());
    Ok(stat)
}

pub fn list_stats(data: &AppData, user_id: &str) -> Vec<Stat> {
    let mut stats: Vec<Stat> = data
        .stats
        .values()
        .filter(|stat| stat.user_id == user_id)
        .cloned()
        .collect();
    stats.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    stats
}

pub fn stat<'a>(data: &'a AppData, user_id: &str, stat_id: &str) -> Result<&'a Stat, StoreError> {
    data.stats
        .get(stat_id)
        .filter(|stat| stat.user_id == user_id)
        .ok_or(StoreError::NotFound("stat"))
}

pub fn update_stat(
    data: &mut AppData,
    user_id: &str,
    stat_id: &str,
    req: StatRequest,
) -> Result<Stat, StoreError> {
    let stat = data
        .stats
        .get_mut(stat_id)
        .filter(|stat| stat.user_id == user_id)
        .ok_or(StoreError::NotFound("stat"))?;
    stat.name = req.name;
    stat.description = req.description;
    stat.measurement_label = req.measurement_label;
    Ok(stat.clone())
}

/// Removes the stat together with every item recorded against it.
pub fn delete_stat(data: &mut AppData, user_id: &str, stat_id: &str) -> Result<Stat, StoreError> {
    stat(data, user_id, stat_id)?;
    data.stat_items.retain(|_, item| item.stat_id != stat_id);
    data.stats
        .remove(stat_id)
        .ok_or(StoreError::NotFound("stat"))
}

/// Inserts all items or none of them.
pub fn add_items(
    data: &mut AppData,
    user_id: &str,
    stat_id: &str,
    reqs: Vec<StatItemRequest>,
) -> Result<Vec<StatItem>, StoreError> {
    stat(data, user_id, stat_id)?;
    let items: Vec<StatItem> = reqs
        .into_iter()
        .map(|req| StatItem {
            id: new_id(),
            stat_id: stat_id.to_string(),
            user_id: user_id.to_string(),
            date_of_entry: req.date_of_entry,
            numeric_value: req.numeric_value,
            note: req.note,
        })
        .collect();
    for item in &items {
        data.stat_items.insert(item.id.clone(), item.clone());
    }
    Ok(items)
}

/// Items of one stat ordered by date, optionally limited to `range`.
pub fn list_items(
    data: &AppData,
    user_id: &str,
    stat_id: &str,
    range: Option<&DateRange>,
) -> Result<Vec<StatItem>, StoreError> {
    stat(data, user_id, stat_id)?;
    let mut items: Vec<StatItem> = data
        .stat_items
        .values()
        .filter(|item| item.stat_id == stat_id && item.user_id == user_id)
        .filter(|item| range.is_none_or(|range| range.contains(item.date_of_entry)))
        .cloned()
        .collect();
    sort_by_date(&mut items);
    Ok(items)
}

pub fn update_item(
    data: &mut AppData,
    user_id: &str,
    stat_id: &str,
    item_id: &str,
    req: StatItemRequest,
) -> Result<StatItem, StoreError> {
    stat(data, user_id, stat_id)?;
    let item = data
        .stat_items
        .get_mut(item_id)
        .filter(|item| item.stat_id == stat_id && item.user_id == user_id)
        .ok_or(StoreError::NotFound("stat item"))?;
    item.date_of_entry = req.date_of_entry;
    item.numeric_value = req.numeric_value;
    item.note = req.note;
    Ok(item.clone())
}

pub fn delete_item(
    data: &mut AppData,
    user_id: &str,
    stat_id: &str,
    item_id: &str,
) -> Result<StatItem, StoreError> {
    stat(data, user_id, stat_id)?;
    let owned = data
        .stat_items
        .get(item_id)
        .is_some_and(|item| item.stat_id == stat_id && item.user_id == user_id);
    if !owned {
        return Err(StoreError::NotFound("stat item"));
    }
    data.stat_items
        .remove(item_id)
        .ok_or(StoreError::NotFound("stat item"))
}

pub fn stats_with_items(data: &AppData, user_id: &str) -> Vec<StatWithItems> {
    list_stats(data, user_id)
        .into_iter()
        .map(|stat| {
            let mut stat_items: Vec<StatItem> = data
                .stat_items
                .values()
                .filter(|item| item.stat_id == stat.id)
                .cloned()
                .collect();
            sort_by_date(&mut stat_items);
            StatWithItems { stat, stat_items }
        })
        .collect()
}

fn sort_by_date(items: &mut [StatItem]) {
    items.sort_by(|a, b| {
        a.date_of_entry
            .cmp(&b.date_of_entry)
            .then_with(|| a.id.cmp(&b.id))
    });
}
