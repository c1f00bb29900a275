use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::statsig::statsig_error::{Result, StatsigError};
use crate::statsig::statsig_specs_client::IdListRange;

use super::data_types::APIIdList;

pub type IdLists = HashMap<String, Arc<IdList>>;

/// A named set of ids, together with how much of its backing file has been applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdList {
    pub name: String,
    pub ids: HashSet<String>,
    pub read_bytes: u64,
    pub url: String,
    pub file_id: String,
    pub creation_time: i64,
}

enum IdListOp<'a> {
    Add(&'a str),
    Remove(&'a str),
}

impl IdList {
    pub fn new(name: &str) -> IdList {
        IdList {
            name: name.to_string(),
            ..IdList::default()
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Decides what, if anything, to download for this list given its directory entry.
    ///
    /// Returns the list the download should be applied to: either a copy of `local`, or a
    /// fresh list when the backing file was rotated. `None` means nothing to do this cycle.
    pub fn plan_download(name: &str, server_list: &APIIdList, local: Option<&IdList>) -> Option<IdList> {
        let url = server_list.url.as_deref()?;
        let new_file_id = server_list.file_id.as_deref()?;

        let mut list = match local {
            Some(local) => local.clone(),
            None => IdList::new(name),
        };

        if server_list.creation_time < list.creation_time {
            return None;
        }

        if new_file_id != list.file_id {
            list = IdList {
                name: name.to_string(),
                ids: HashSet::new(),
                read_bytes: 0,
                url: url.to_string(),
                file_id: new_file_id.to_string(),
                creation_time: server_list.creation_time,
            };
        }
        list.url = url.to_string();

        if server_list.size <= list.read_bytes || url.is_empty() {
            return None;
        }

        Some(list)
    }

    /// Applies a range fetched from `read_bytes` onwards.
    ///
    /// The whole range is validated before any id is touched, so a corrupt range leaves the
    /// list as it was.
    pub fn apply_range(&mut self, range: &IdListRange) -> Result<()> {
        let leading = range.text.chars().find(|c| !c.is_whitespace());
        if !matches!(leading, Some('+') | Some('-')) {
            return Err(StatsigError::InvalidRange {
                list_name: self.name.clone(),
                leading,
            });
        }

        let ops: Vec<IdListOp> = range
            .text
            .lines()
            .filter(|line| line.chars().count() > 1)
            .filter_map(|line| {
                // the first character is the operator, even when it is whitespace
                let mut chars = line.chars();
                let op = chars.next()?;
                let id = chars.as_str().trim();
                match op {
                    '+' => Some(IdListOp::Add(id)),
                    '-' => Some(IdListOp::Remove(id)),
                    _ => None,
                }
            })
            .collect();

        for op in ops {
            match op {
                IdListOp::Add(id) => {
                    self.ids.insert(id.to_string());
                }
                IdListOp::Remove(id) => {
                    self.ids.remove(id);
                }
            }
        }

        self.read_bytes += range.content_length;
        Ok(())
    }
}
