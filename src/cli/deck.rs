//! Deck commands (`carddeck split|join|print`).

use std::io::{self, Write};

use anyhow::{Context, Result};
use carddeck::{DeckSource, JoinReport, PrintReport, SplitCount, SplitReport, parse_join_args};
use clap::Args;

use crate::cli::Settings;
use crate::cli::utils::{deck_files, load_units, open_printer};

/// Arguments for `carddeck split`.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Cards in the first deck; `-N` puts the last N cards in the second deck.
    #[arg(allow_hyphen_values = true)]
    pub count: String,
    /// Source deck file, or CDP1..CDP3 to split what a punch unit wrote.
    pub source: String,
    /// Deck receiving the first run of cards.
    pub dest1: String,
    /// Deck receiving the remaining cards.
    pub dest2: String,
}

/// Arguments for `carddeck join`.
#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Source decks followed by `as <dest>`.
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub decks: Vec<String>,
}

/// Arguments for `carddeck print`.
#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Deck file to print.
    pub deck: String,
}

pub fn split(settings: &Settings, args: SplitArgs) -> Result<()> {
    let count: SplitCount = args.count.parse().context("split")?;
    let source = DeckSource::parse(&args.source);
    let mut units = load_units(settings).context("split")?;
    let mut files = deck_files(settings);
    let report = carddeck::split(
        &mut files,
        units.as_mut(),
        count,
        &source,
        &args.dest1,
        &args.dest2,
    )
    .with_context(|| format!("split of {} failed", args.source))?;
    report_split(&mut io::stdout(), settings.quiet, &report).context("split")
}

pub fn join(settings: &Settings, args: JoinArgs) -> Result<()> {
    let (sources, dest) = parse_join_args(&args.decks).context("join")?;
    let mut files = deck_files(settings);
    let report = carddeck::join(&mut files, &sources, &dest)
        .with_context(|| format!("join into {dest} failed"))?;
    report_join(&mut io::stdout(), settings.quiet, &report, &dest).context("join")
}

pub fn print(settings: &Settings, args: PrintArgs) -> Result<()> {
    let units = load_units(settings).context("print")?;
    let mut printer = open_printer(units.as_ref()).context("print")?;
    let mut files = deck_files(settings);
    let report = {
        let mut console = io::stdout().lock();
        carddeck::print(
            &mut files,
            &args.deck,
            &mut console,
            printer.as_mut().map(|file| file as &mut dyn Write),
        )
        .with_context(|| format!("print of {} failed", args.deck))?
    };
    report_print(&mut io::stdout(), settings.quiet, &report, &args.deck).context("print")
}

/// Card counts of a split, unless `quiet`.
pub fn report_split(out: &mut dyn Write, quiet: bool, report: &SplitReport) -> io::Result<()> {
    if quiet {
        return Ok(());
    }
    writeln!(out, "Deck split to {}/{} cards", report.first, report.second)
}

pub fn report_join(
    out: &mut dyn Write,
    quiet: bool,
    report: &JoinReport,
    dest: &str,
) -> io::Result<()> {
    if quiet {
        return Ok(());
    }
    for (idx, (name, cards)) in report.sources.iter().enumerate() {
        writeln!(out, "Source Deck {} has {} cards ({})", idx + 1, cards, name)?;
    }
    writeln!(out, "Destination Deck has {} cards ({})", report.total, dest)
}

pub fn report_print(
    out: &mut dyn Write,
    quiet: bool,
    report: &PrintReport,
    deck: &str,
) -> io::Result<()> {
    if quiet {
        return Ok(());
    }
    writeln!(out, "Printed Deck with {} cards ({})", report.cards, deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::exit_status;
    use anyhow::anyhow;
    use carddeck::units::UnitError;
    use carddeck::{CardIoError, DeckError, Status};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn join_report() -> JoinReport {
        JoinReport {
            sources: vec![("a.crd".to_string(), 3), ("b.crd".to_string(), 5)],
            total: 8,
        }
    }

    fn reports(quiet: bool) -> String {
        let mut out = Vec::new();
        report_split(&mut out, quiet, &SplitReport { first: 210, second: 40 }).unwrap();
        report_join(&mut out, quiet, &join_report(), "out.crd").unwrap();
        report_print(&mut out, quiet, &PrintReport { cards: 12 }, "list.crd").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn counts_are_reported() {
        assert_eq!(
            reports(false),
            "Deck split to 210/40 cards\n\
             Source Deck 1 has 3 cards (a.crd)\n\
             Source Deck 2 has 5 cards (b.crd)\n\
             Destination Deck has 8 cards (out.crd)\n\
             Printed Deck with 12 cards (list.crd)\n"
        );
    }

    #[test]
    fn quiet_suppresses_every_count() {
        assert_eq!(reports(true), "");
    }

    fn io_err() -> std::io::Error {
        std::io::Error::other("disk gone")
    }

    #[test]
    fn deck_errors_keep_their_exit_code_through_context() {
        let cases = [
            (DeckError::MalformedArgument("missing filename".into()), Status::Arg, 1),
            (DeckError::Unit(UnitError::NoDevice("CDP1".into())), Status::NxDev, 2),
            (DeckError::Unit(UnitError::NoUnit("CDP2".into())), Status::NxUn, 3),
            (DeckError::Unit(UnitError::NotAttached("CDP1".into())), Status::NotAtt, 4),
            (
                DeckError::DeckTooLarge { file: "big".into(), limit: 10_000 },
                Status::IErr,
                5,
            ),
            (DeckError::OutOfRange { start: 2, end: 4, len: 3 }, Status::IErr, 5),
            (
                DeckError::Read { file: "in".into(), source: CardIoError::Io(io_err()) },
                Status::Io,
                6,
            ),
            (
                DeckError::Write { file: "out".into(), source: CardIoError::Io(io_err()) },
                Status::Io,
                6,
            ),
            (DeckError::Print { sink: "printer".into(), source: io_err() }, Status::Io, 6),
            (
                DeckError::Unit(UnitError::Read {
                    path: PathBuf::from("units.json"),
                    source: io_err(),
                }),
                Status::Io,
                6,
            ),
        ];
        for (deck_err, status, code) in cases {
            let message = deck_err.to_string();
            let err = Err::<(), _>(deck_err)
                .context("split")
                .context("outer")
                .unwrap_err();
            assert_eq!(exit_status(&err), status, "{message}");
            assert_eq!(exit_status(&err).exit_code(), code, "{message}");
        }
        assert_eq!(Status::Ok.exit_code(), 0);
    }

    #[test]
    fn other_failures_are_argument_errors() {
        let err = anyhow!("cannot parse word 'X'");
        assert_eq!(exit_status(&err), Status::Arg);
    }
}
