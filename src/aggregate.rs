//! Aggregation of extracted rows into the normalized collections
//!
//! Merges the ordered sequence of per-row credentials and host grants into
//! the user list and the host index. First-seen order is semantically
//! meaningful to provisioning consumers and is preserved everywhere; nothing
//! here sorts.

use std::collections::HashMap;

use tracing::debug;

use crate::document::{ResourceIndex, UserAccount};
use crate::row::Credentials;

/// One classified row, ready for aggregation: the credentials plus the
/// hosts its flags granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRow {
    pub credentials: Credentials,
    pub hosts: Vec<String>,
}

/// Merge extracted rows into the user list and the host index.
///
/// A username may span multiple raw rows. The first row naming a username
/// fixes that user's password and ssh key; later rows contribute only their
/// host grants, unioned in first-seen order. The host index is derived from
/// the finished user list and is never edited directly.
pub fn aggregate(rows: Vec<ExtractedRow>) -> (Vec<UserAccount>, ResourceIndex) {
    let mut users: Vec<UserAccount> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match position.get(&row.credentials.username) {
            Some(&at) => {
                let user = &mut users[at];
                for host in row.hosts {
                    if !user.hosts.contains(&host) {
                        user.hosts.push(host);
                    }
                }
            }
            None => {
                position.insert(row.credentials.username.clone(), users.len());
                let mut hosts: Vec<String> = Vec::new();
                for host in row.hosts {
                    if !hosts.contains(&host) {
                        hosts.push(host);
                    }
                }
                users.push(UserAccount {
                    username: row.credentials.username,
                    password: row.credentials.password,
                    ssh_key: row.credentials.ssh_key,
                    hosts,
                    host_count: 0,
                });
            }
        }
    }

    for user in &mut users {
        user.host_count = user.hosts.len();
    }

    let mut index = ResourceIndex::new();
    for user in &users {
        for host in &user.hosts {
            index.add(host, &user.username);
        }
    }

    debug!(users = users.len(), hosts = index.len(), "aggregation complete");
    (users, index)
}
