use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::Error;

/// Run `git <args>` inside `workdir` and return its trimmed stdout.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - `url.<base>.insteadOf` rewrites
/// - Any authentication configured in ~/.gitconfig
///
/// On failure the returned message is the command's stderr.
fn run(workdir: &Path, args: &[&str]) -> Result<String, String> {
    debug!("git {} (in {})", args.join(" "), workdir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .output()
        .map_err(|e| format!("failed to run git: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(if stderr.is_empty() {
            format!("git {} exited with {}", args.join(" "), output.status)
        } else {
            stderr
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Returns a hint when `stderr` looks like an authentication failure.
fn auth_hint(stderr: &str) -> Option<String> {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Make sure you have access to the repository. For private repos, ensure you have:\n\
            - SSH key added to ssh-agent\n\
            - Git credentials configured\n\
            - Personal access token set up"
                .to_string(),
        )
    } else {
        None
    }
}

/// `git init` in `workdir`
pub fn init(workdir: &Path) -> Result<(), Error> {
    run(workdir, &["init", "--quiet"])
        .map(|_| ())
        .map_err(|message| Error::Init {
            path: workdir.to_path_buf(),
            message,
        })
}

/// `git remote add <name> <url>`
pub fn remote_add(workdir: &Path, name: &str, url: &str) -> Result<(), Error> {
    run(workdir, &["remote", "add", name, url])
        .map(|_| ())
        .map_err(|message| Error::Remote {
            remote: name.to_string(),
            url: url.to_string(),
            message,
        })
}

/// Query the remote's symbolic `HEAD` and return the branch it points at.
pub fn default_branch(workdir: &Path, remote: &str) -> Result<String, Error> {
    let unresolved = |message: String| Error::DefaultBranchUnresolved {
        remote: remote.to_string(),
        message,
    };

    let stdout = run(workdir, &["ls-remote", "--symref", remote, "HEAD"]).map_err(|stderr| {
        match auth_hint(&stderr) {
            Some(hint) => unresolved(format!("{}\n  hint: {}", stderr, hint)),
            None => unresolved(stderr),
        }
    })?;

    parse_symref_head(&stdout)
        .ok_or_else(|| unresolved("remote does not advertise a symbolic HEAD".to_string()))
}

/// Extracts `<name>` from the `ref: refs/heads/<name>\tHEAD` line of
/// `git ls-remote --symref` output.
pub fn parse_symref_head(ls_remote: &str) -> Option<String> {
    ls_remote.lines().find_map(|line| {
        // Format: ref: <target>\t<symref>
        let rest = line.strip_prefix("ref:")?;
        let (target, name) = rest.trim_start().split_once('\t')?;
        if name.trim() != "HEAD" {
            return None;
        }
        target
            .strip_prefix("refs/heads/")
            .filter(|branch| !branch.is_empty())
            .map(|branch| branch.to_string())
    })
}

/// Shallow-fetch `revision` and file it under `refs/remotes/<remote>/<branch>`.
///
/// The revision is named directly as the source side of the refspec, so it
/// does not have to be the tip of any advertised branch.
pub fn fetch_revision(
    workdir: &Path,
    remote: &str,
    revision: &str,
    branch: &str,
) -> Result<(), Error> {
    let refspec = format!("+{}:refs/remotes/{}/{}", revision, remote, branch);
    run(workdir, &["fetch", "--depth=1", "--no-tags", remote, &refspec])
        .map(|_| ())
        .map_err(|stderr| Error::Fetch {
            revision: revision.to_string(),
            hint: auth_hint(&stderr),
            message: stderr,
        })
}

/// Point `HEAD` at the unborn local branch `refs/heads/<branch>`.
///
/// Fails if the branch already exists.
pub fn create_branch_ref(workdir: &Path, branch: &str) -> Result<(), Error> {
    let full_ref = format!("refs/heads/{}", branch);
    if run(workdir, &["rev-parse", "--verify", "--quiet", &full_ref]).is_ok() {
        return Err(Error::RefCreate {
            branch: branch.to_string(),
            message: "ref already exists".to_string(),
        });
    }

    run(workdir, &["symbolic-ref", "HEAD", &full_ref])
        .map(|_| ())
        .map_err(|message| Error::RefCreate {
            branch: branch.to_string(),
            message,
        })
}

/// Resolve `revision` to a commit id in the local object store.
pub fn resolve_commit(workdir: &Path, revision: &str) -> Result<String, Error> {
    let spec = format!("{}^{{commit}}", revision);
    run(workdir, &["rev-parse", "--verify", "--quiet", &spec]).map_err(|message| Error::Resolve {
        revision: revision.to_string(),
        message,
    })
}

/// `git reset --hard <commit>`, moving the current branch and working tree.
pub fn reset_hard(workdir: &Path, commit: &str) -> Result<(), Error> {
    run(workdir, &["reset", "--hard", "--quiet", commit])
        .map(|_| ())
        .map_err(|message| Error::Reset {
            commit: commit.to_string(),
            message,
        })
}

/// The commit currently checked out in `workdir`.
pub fn head_commit(workdir: &Path) -> Result<String, Error> {
    run(workdir, &["rev-parse", "HEAD"]).map_err(|message| Error::Reset {
        commit: "HEAD".to_string(),
        message,
    })
}
