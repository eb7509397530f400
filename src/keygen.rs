//! Operator-side helpers for issuing license keys.
//!
//! [`KeyRequest::gather`] combines command-line answers with interactive
//! prompts; [`KeyRequest::issue`] signs the result.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use chrono::{Duration, NaiveDate};

use crate::errors::{LicenseError, LicenseResult};
use crate::fingerprint::{is_valid_fingerprint, normalize_fingerprint};
use crate::license_key::generate_license_key;
use crate::payload::EXPIRATION_FORMAT;
use crate::signing::LicenseSigner;

/// How long an issued license should last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPreset {
    Lifetime,
    /// 30 days.
    OneMonth,
    /// 180 days.
    SixMonths,
    /// 365 days.
    OneYear,
    /// A specific last day.
    Until(NaiveDate),
}

impl ExpirationPreset {
    /// Resolves the expiration date relative to `today`.
    pub fn resolve(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            ExpirationPreset::Lifetime => return None,
            ExpirationPreset::Until(date) => return Some(date),
            ExpirationPreset::OneMonth => 30,
            ExpirationPreset::SixMonths => 180,
            ExpirationPreset::OneYear => 365,
        };
        Some(today + Duration::days(days))
    }

    /// Maps the interactive menu choice (`1`-`4`) to a preset.
    ///
    /// Choice `5` (custom date) is handled by the caller.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" | "" => Some(ExpirationPreset::Lifetime),
            "2" => Some(ExpirationPreset::OneMonth),
            "3" => Some(ExpirationPreset::SixMonths),
            "4" => Some(ExpirationPreset::OneYear),
            _ => None,
        }
    }
}

impl FromStr for ExpirationPreset {
    type Err = String;

    /// Accepts `lifetime`, `1m`, `6m`, `1y`, or a `YYYY-MM-DD` date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lifetime" | "never" => Ok(ExpirationPreset::Lifetime),
            "1m" | "month" => Ok(ExpirationPreset::OneMonth),
            "6m" => Ok(ExpirationPreset::SixMonths),
            "1y" | "year" => Ok(ExpirationPreset::OneYear),
            other => parse_expiration_date(other).map(ExpirationPreset::Until),
        }
    }
}

impl fmt::Display for ExpirationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpirationPreset::Lifetime => write!(f, "Lifetime"),
            ExpirationPreset::OneMonth => write!(f, "1 month"),
            ExpirationPreset::SixMonths => write!(f, "6 months"),
            ExpirationPreset::OneYear => write!(f, "1 year"),
            ExpirationPreset::Until(date) => write!(f, "{}", date.format(EXPIRATION_FORMAT)),
        }
    }
}

/// Parses an operator-entered `YYYY-MM-DD` date.
pub fn parse_expiration_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), EXPIRATION_FORMAT)
        .map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {e}", input.trim()))
}

/// Picks the client name, falling back to `default` for blank input.
pub fn client_name_or_default(input: Option<&str>, default: &str) -> String {
    match input.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default.to_string(),
    }
}

/// Asks the operator questions, one answer per line.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `question` and returns the trimmed answer.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] once the input is exhausted.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}\n> ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before an answer was given",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Asks until a non-empty machine id is given.
    pub fn machine_id(&mut self) -> io::Result<String> {
        loop {
            let input = self.ask("Enter customer machine ID (XXXX-XXXX-XXXX-XXXX):")?;
            let machine_id = normalize_fingerprint(&input);
            if !machine_id.is_empty() {
                return Ok(machine_id);
            }
            writeln!(self.output, "Machine ID cannot be empty.")?;
        }
    }

    /// Asks for an optional client name, using `default` for a blank answer.
    pub fn client_name(&mut self, default: &str) -> io::Result<String> {
        let input = self.ask("Enter customer name (optional):")?;
        Ok(client_name_or_default(Some(input.as_str()), default))
    }

    /// Shows the expiration menu and returns the chosen preset.
    pub fn expiration(&mut self) -> io::Result<ExpirationPreset> {
        writeln!(self.output, "Expiration options:")?;
        writeln!(self.output, "1. Lifetime (no expiration)")?;
        writeln!(self.output, "2. 1 month")?;
        writeln!(self.output, "3. 6 months")?;
        writeln!(self.output, "4. 1 year")?;
        writeln!(self.output, "5. Custom date")?;

        loop {
            let choice = self.ask("Select option (1-5):")?;
            if let Some(preset) = ExpirationPreset::from_menu_choice(&choice) {
                return Ok(preset);
            }
            if choice == "5" {
                return self.custom_date().map(ExpirationPreset::Until);
            }
            writeln!(self.output, "Please choose 1-5.")?;
        }
    }

    fn custom_date(&mut self) -> io::Result<NaiveDate> {
        loop {
            match parse_expiration_date(&self.ask("Enter expiration date (YYYY-MM-DD):")?) {
                Ok(date) => return Ok(date),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }
}

/// Answers supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct KeyOptions {
    pub machine_id: Option<String>,
    pub client_name: Option<String>,
    pub expiration: Option<ExpirationPreset>,
}

/// Everything needed to sign one license key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    pub machine_id: String,
    pub client_name: String,
    pub expiration: ExpirationPreset,
}

impl KeyRequest {
    /// Completes `options` into a request.
    ///
    /// Without a machine id the session is interactive: the machine id and
    /// any other missing answer are asked through `prompter`. Otherwise
    /// missing answers take their defaults (the configured client name and a
    /// lifetime license) and nothing is read.
    pub fn gather<R: BufRead, W: Write>(
        options: KeyOptions,
        default_client_name: &str,
        prompter: &mut Prompter<R, W>,
    ) -> LicenseResult<Self> {
        let input_err = |e: io::Error| LicenseError::InputError(e.to_string());
        let interactive = options.machine_id.is_none();

        let machine_id = match options.machine_id {
            Some(id) => normalize_fingerprint(&id),
            None => prompter.machine_id().map_err(input_err)?,
        };
        if !is_valid_fingerprint(&machine_id) {
            log::warn!("Machine id '{}' does not look like XXXX-XXXX-XXXX-XXXX", machine_id);
        }

        let client_name = match options.client_name {
            Some(name) => client_name_or_default(Some(name.as_str()), default_client_name),
            None if interactive => prompter.client_name(default_client_name).map_err(input_err)?,
            None => default_client_name.to_string(),
        };

        let expiration = match options.expiration {
            Some(preset) => preset,
            None if interactive => prompter.expiration().map_err(input_err)?,
            None => ExpirationPreset::Lifetime,
        };

        Ok(Self {
            machine_id,
            client_name,
            expiration,
        })
    }

    /// Last day of validity when issued on `today`.
    pub fn expiration_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.expiration.resolve(today)
    }

    /// Signs the request as of `today`.
    pub fn issue(&self, signer: &LicenseSigner, today: NaiveDate) -> String {
        generate_license_key(
            signer,
            &self.machine_id,
            &self.client_name,
            self.expiration_date(today),
        )
    }
}
