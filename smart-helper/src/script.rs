//! Console command lines
//!
//! `--exec` takes one command per flag, written the way an operator would
//! type it:
//!
//! ```text
//! helper:  accept <ref> | reject <ref> | advance | toggle | status <available|busy>
//! admin:   cancel <ref> | complete <ref> | assign <ref> <helper-ref>
//!          helper-status <helper-ref> <status> | suspend <helper-ref>
//!          block <ref> | allow <ref> | set <setting> <on|off>
//!          book "<customer>" <service> <amount>
//! ```
//!
//! A reference is either a literal id or `#N`, the N-th entry (from 1) of
//! the matching list in the console as it stands when the line runs.

use anyhow::{anyhow, bail, Context, Result};
use smart_helper_core::{
    AdminCommand, AdminSnapshot, HelperCommand, HelperSnapshot, HelperStatus, ServiceType,
    SettingKey,
};

/// Split a line on whitespace, keeping double-quoted runs together
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        bail!("unterminated quote in `{}`", line);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Resolve `#N` against `ids`, or take the token as a literal id
fn resolve<'a>(token: &str, ids: impl Iterator<Item = &'a str>, what: &str) -> Result<String> {
    let Some(index) = token.strip_prefix('#') else {
        return Ok(token.to_string());
    };
    let n: usize = index
        .parse()
        .with_context(|| format!("`{}` is not a {} reference", token, what))?;
    if n == 0 {
        bail!("{} references start at #1", what);
    }
    ids.map(str::to_string)
        .nth(n - 1)
        .ok_or_else(|| anyhow!("no {} at {}", what, token))
}

fn arg<'a>(tokens: &'a [String], index: usize, usage: &str) -> Result<&'a str> {
    tokens
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("usage: {}", usage))
}

fn parse_switch(token: &str) -> Result<bool> {
    match token.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => bail!("expected on or off, got `{}`", token),
    }
}

fn parse_status(token: &str) -> Result<HelperStatus> {
    token.parse::<HelperStatus>().map_err(|e| anyhow!(e))
}

/// Parse one helper console line
pub fn parse_helper(line: &str, snapshot: &HelperSnapshot) -> Result<HelperCommand> {
    let tokens = tokenize(line)?;
    let Some(verb) = tokens.first() else {
        bail!("empty command");
    };
    let incoming = || snapshot.incoming_requests.iter().map(|r| r.id.as_str());

    let command = match verb.as_str() {
        "accept" => HelperCommand::Accept(resolve(
            arg(&tokens, 1, "accept <request>")?,
            incoming(),
            "incoming request",
        )?),
        "reject" => HelperCommand::Reject(resolve(
            arg(&tokens, 1, "reject <request>")?,
            incoming(),
            "incoming request",
        )?),
        "advance" => HelperCommand::AdvanceJob,
        "toggle" => HelperCommand::ToggleStatus,
        "status" => HelperCommand::SetStatus(parse_status(arg(&tokens, 1, "status <status>")?)?),
        other => bail!("unknown helper command `{}`", other),
    };
    Ok(command)
}

/// Parse one admin console line
pub fn parse_admin(line: &str, snapshot: &AdminSnapshot) -> Result<AdminCommand> {
    let tokens = tokenize(line)?;
    let Some(verb) = tokens.first() else {
        bail!("empty command");
    };
    let requests = || snapshot.requests.iter().map(|r| r.id.as_str());
    let helpers = || snapshot.helpers.iter().map(|h| h.id.as_str());

    let command = match verb.as_str() {
        "cancel" => AdminCommand::CancelRequest(resolve(
            arg(&tokens, 1, "cancel <request>")?,
            requests(),
            "request",
        )?),
        "complete" => AdminCommand::ForceComplete(resolve(
            arg(&tokens, 1, "complete <request>")?,
            requests(),
            "request",
        )?),
        "assign" => {
            let usage = "assign <request> <helper>";
            AdminCommand::ManualAssign {
                request_id: resolve(arg(&tokens, 1, usage)?, requests(), "request")?,
                helper_id: resolve(arg(&tokens, 2, usage)?, helpers(), "helper")?,
            }
        }
        "helper-status" => {
            let usage = "helper-status <helper> <status>";
            AdminCommand::ChangeHelperStatus {
                helper_id: resolve(arg(&tokens, 1, usage)?, helpers(), "helper")?,
                status: parse_status(arg(&tokens, 2, usage)?)?,
            }
        }
        "suspend" => AdminCommand::SuspendHelper(resolve(
            arg(&tokens, 1, "suspend <helper>")?,
            helpers(),
            "helper",
        )?),
        "block" => AdminCommand::BlockFraud(resolve(
            arg(&tokens, 1, "block <request>")?,
            requests(),
            "request",
        )?),
        "allow" => AdminCommand::AllowFraud(resolve(
            arg(&tokens, 1, "allow <request>")?,
            requests(),
            "request",
        )?),
        "set" => {
            let usage = "set <setting> <on|off>";
            AdminCommand::UpdateSetting {
                key: arg(&tokens, 1, usage)?
                    .parse::<SettingKey>()
                    .map_err(|e| anyhow!(e))?,
                value: parse_switch(arg(&tokens, 2, usage)?)?,
            }
        }
        "book" => {
            let usage = "book <customer> <service> <amount>";
            AdminCommand::CreateRequest {
                customer_name: arg(&tokens, 1, usage)?.to_string(),
                service_type: arg(&tokens, 2, usage)?
                    .parse::<ServiceType>()
                    .map_err(|e| anyhow!(e))?,
                payment_amount: arg(&tokens, 3, usage)?
                    .parse()
                    .context("amount must be a whole number")?,
            }
        }
        other => bail!("unknown admin command `{}`", other),
    };
    Ok(command)
}
