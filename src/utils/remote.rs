//! Remote destination string building

use crate::config::RemoteTarget;

/// Build the ssh endpoint for a remote target (`user@host`, or bare `host`
/// when no user is configured)
pub fn endpoint(target: &RemoteTarget) -> String {
    match &target.user {
        Some(user) => format!("{}@{}", user, target.host),
        None => target.host.clone(),
    }
}

/// Build a path on the remote target, optionally prefixed with the ssh
/// endpoint for use as an rsync destination.
///
/// The base directory is only resolved when a sub path is given; it falls
/// back to `/home/<user>` when no directory is configured but a user is, and
/// to `~` when neither is. An empty sub path behaves as no sub path: the
/// result is just the endpoint (or an empty string without the prefix).
pub fn build_remote_path(
    target: &RemoteTarget,
    sub_path: Option<&str>,
    with_prefix: bool,
) -> String {
    let Some(sub) = sub_path.filter(|s| !s.is_empty()) else {
        return if with_prefix {
            endpoint(target)
        } else {
            String::new()
        };
    };

    let dir = match (&target.dir, &target.user) {
        (Some(dir), _) => dir.clone(),
        (None, Some(user)) => format!("/home/{}", user),
        (None, None) => "~".to_string(),
    };

    if with_prefix {
        format!("{}:{}/{}", endpoint(target), dir, sub)
    } else {
        format!("{}/{}", dir, sub)
    }
}
