//! Pure mapping from (action, verdict, answer) to a removal directive.
//!
//! | action | answer | verdict | result |
//! |---|---|---|---|
//! | list | - | any | report only |
//! | remove | - | any | remove, keep data |
//! | delete | - | unprotected | remove with data |
//! | delete | - | protected | remove, keep data (downgraded) |
//! | interactive | `r` | any | remove, keep data |
//! | interactive | `d` | unprotected | remove with data |
//! | interactive | `d` | protected | remove, keep data (downgraded) |
//! | interactive | other | any | skip |

use crate::model::{
    Action, InteractiveChoice, RemovalDirective, Resolution, SafetyVerdict, TorrentId,
};

/// Resolve one torrent.
///
/// `choice` is only consulted for [`Action::Interactive`]; a missing choice skips.
#[must_use]
pub fn resolve(
    action: Action,
    torrent_id: TorrentId,
    verdict: SafetyVerdict,
    choice: Option<InteractiveChoice>,
) -> Resolution {
    match action {
        Action::List => Resolution::ReportOnly,
        Action::Remove => keep_data(torrent_id),
        Action::Delete => with_data(torrent_id, verdict),
        Action::Interactive => match choice.unwrap_or(InteractiveChoice::Skip) {
            InteractiveChoice::Remove => keep_data(torrent_id),
            InteractiveChoice::Delete => with_data(torrent_id, verdict),
            InteractiveChoice::Skip => Resolution::Skipped,
        },
    }
}

const fn keep_data(torrent_id: TorrentId) -> Resolution {
    Resolution::Directive {
        directive: RemovalDirective::keep_data(torrent_id),
        downgraded: false,
    }
}

const fn with_data(torrent_id: TorrentId, verdict: SafetyVerdict) -> Resolution {
    Resolution::Directive {
        directive: RemovalDirective::with_data(torrent_id, verdict),
        downgraded: verdict.is_protected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: TorrentId = TorrentId(42);
    const VERDICTS: [SafetyVerdict; 2] = [SafetyVerdict::Unprotected, SafetyVerdict::Protected];
    const ACTIONS: [Action; 4] = [
        Action::List,
        Action::Delete,
        Action::Remove,
        Action::Interactive,
    ];
    const CHOICES: [Option<InteractiveChoice>; 4] = [
        None,
        Some(InteractiveChoice::Remove),
        Some(InteractiveChoice::Delete),
        Some(InteractiveChoice::Skip),
    ];

    fn deletes_data(resolution: Resolution) -> Option<bool> {
        resolution.directive().map(|directive| directive.delete_data())
    }

    #[test]
    fn list_never_produces_a_directive() {
        for verdict in VERDICTS {
            for choice in CHOICES {
                assert_eq!(resolve(Action::List, ID, verdict, choice), Resolution::ReportOnly);
            }
        }
    }

    #[test]
    fn remove_always_keeps_data() {
        for verdict in VERDICTS {
            assert_eq!(deletes_data(resolve(Action::Remove, ID, verdict, None)), Some(false));
        }
    }

    #[test]
    fn delete_is_downgraded_for_protected_torrents() {
        let open = resolve(Action::Delete, ID, SafetyVerdict::Unprotected, None);
        assert_eq!(deletes_data(open), Some(true));
        assert!(!open.is_downgraded());

        let protected = resolve(Action::Delete, ID, SafetyVerdict::Protected, None);
        assert_eq!(deletes_data(protected), Some(false));
        assert!(protected.is_downgraded());
    }

    #[test]
    fn interactive_follows_the_answer() {
        let remove = resolve(
            Action::Interactive,
            ID,
            SafetyVerdict::Unprotected,
            Some(InteractiveChoice::Remove),
        );
        assert_eq!(deletes_data(remove), Some(false));

        let delete = resolve(
            Action::Interactive,
            ID,
            SafetyVerdict::Unprotected,
            Some(InteractiveChoice::Delete),
        );
        assert_eq!(deletes_data(delete), Some(true));

        let protected = resolve(
            Action::Interactive,
            ID,
            SafetyVerdict::Protected,
            Some(InteractiveChoice::Delete),
        );
        assert_eq!(deletes_data(protected), Some(false));
        assert!(protected.is_downgraded());
    }

    #[test]
    fn interactive_abstention_skips() {
        for verdict in VERDICTS {
            assert_eq!(
                resolve(Action::Interactive, ID, verdict, None),
                Resolution::Skipped
            );
            assert_eq!(
                resolve(
                    Action::Interactive,
                    ID,
                    verdict,
                    Some(InteractiveChoice::parse(""))
                ),
                Resolution::Skipped
            );
        }
    }

    #[test]
    fn protected_torrents_never_lose_data() {
        for action in ACTIONS {
            for choice in CHOICES {
                let resolution = resolve(action, ID, SafetyVerdict::Protected, choice);
                assert_ne!(deletes_data(resolution), Some(true), "{action} {choice:?}");
            }
        }
    }
}
