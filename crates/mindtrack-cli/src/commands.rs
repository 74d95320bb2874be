use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;

use mindtrack_core::keys;
use mindtrack_core::models::{Answers, RiskAssessment, ScoringResult, Submission};
use mindtrack_instruments::{Instrument, all_instruments, get_instrument};
use mindtrack_model::classifier::Classifier;
use mindtrack_model::features::{FeatureVector, to_features};
use mindtrack_session::machine::SessionState;
use mindtrack_session::session::{AssessmentSession, Collaborators};
use mindtrack_storage::store::{DocumentStore, Query};

/// One row of `mindtrack instruments`.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub items: usize,
    pub pages: usize,
}

pub fn list_instruments() -> Vec<InstrumentInfo> {
    all_instruments()
        .iter()
        .map(|i| InstrumentInfo {
            id: i.id().to_string(),
            name: i.name().to_string(),
            version: i.version().to_string(),
            items: i.schema().items.len(),
            pages: i.pages().len(),
        })
        .collect()
}

pub fn print_instruments(json: bool) -> eyre::Result<()> {
    let rows = list_instruments();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in rows {
        println!(
            "{:<8} {} (v{}, {} items over {} pages)",
            row.id, row.name, row.version, row.items, row.pages
        );
    }
    Ok(())
}

/// Output of a one-shot `score`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub instrument_id: String,
    pub scores: ScoringResult,
    pub features: FeatureVector,
    pub model: RiskAssessment,
    pub percent: u8,
    pub wellbeing: u8,
}

/// Score a complete answer set and classify it without touching storage.
pub async fn score_answers(
    instrument_id: &str,
    answers: &Answers,
    classifier: &Classifier,
) -> eyre::Result<ScoreReport> {
    let instrument = get_instrument(instrument_id)?;
    let scores = instrument.score(answers)?;
    let features = to_features(instrument_id, &scores)?;
    let model = classifier.assess(&features).await;
    tracing::debug!(instrument = instrument_id, risk = model.risk, "scored answers file");
    Ok(ScoreReport {
        instrument_id: instrument_id.to_string(),
        scores,
        features,
        percent: model.percent(),
        wellbeing: model.wellbeing_index(),
        model,
    })
}

pub async fn score_file(
    instrument_id: &str,
    answers_path: &Path,
    classifier: &Classifier,
) -> eyre::Result<()> {
    let raw = std::fs::read_to_string(answers_path)
        .map_err(|e| eyre::eyre!("failed to read {}: {e}", answers_path.display()))?;
    let answers: Answers = serde_json::from_str(&raw)?;
    let report = score_answers(instrument_id, &answers, classifier).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// One line of `mindtrack history`.
pub fn history_line(submission: &Submission) -> String {
    format!(
        "{}  {:<6}  {}  {} risk ({}%)",
        submission.created_at.strftime("%Y-%m-%d %H:%M"),
        submission.instrument_id,
        submission.scores.summary(&submission.instrument_id),
        submission.model.category.label(),
        submission.model.percent(),
    )
}

/// Most recent submissions for `user_id`, newest first.
pub async fn recent_submissions(
    store: &dyn DocumentStore,
    user_id: &str,
    limit: usize,
) -> Vec<Submission> {
    let query = Query::collection(keys::submissions(user_id))
        .order_by("created_at", true)
        .limit(limit);
    let docs = store.subscribe(query).next().await.unwrap_or_default();
    docs.into_iter()
        .filter_map(|doc| match Submission::from_document(doc.data) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(path = %doc.path, error = %e, "skipping unreadable submission");
                None
            }
        })
        .collect()
}

pub async fn print_history(store: &dyn DocumentStore, user_id: &str, limit: usize) -> eyre::Result<()> {
    let submissions = recent_submissions(store, user_id, limit).await;
    if submissions.is_empty() {
        println!("No submissions for {user_id}.");
        return Ok(());
    }
    for submission in &submissions {
        println!("{}", history_line(submission));
    }
    Ok(())
}

/// What the user typed at an item prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptInput {
    Answer(i32),
    Keep,
    Back,
    Quit,
}

pub fn parse_input(line: &str) -> Option<PromptInput> {
    match line.trim() {
        "" => Some(PromptInput::Keep),
        "b" | "back" => Some(PromptInput::Back),
        "q" | "quit" => Some(PromptInput::Quit),
        other => other.parse().ok().map(PromptInput::Answer),
    }
}

fn read_line(input: &mut impl BufRead) -> eyre::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Walk the user through an instrument page by page over `input`/`out`.
///
/// Every accepted answer is autosaved, so quitting midway (or EOF) resumes
/// from the same answers next time.
pub async fn run_session(
    instrument_id: &str,
    deps: Collaborators,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> eyre::Result<Option<RiskAssessment>> {
    let mut session = AssessmentSession::open(instrument_id, deps)?;
    let instrument = get_instrument(instrument_id)?;
    let options = instrument.schema().scale.options();

    writeln!(out, "{}", instrument.name())?;
    for option in &options {
        writeln!(out, "  {} = {}", option.value, option.label)?;
    }
    writeln!(out, "Enter a value, blank to keep, 'b' to go back, 'q' to quit.")?;

    loop {
        let page = match session.machine().page() {
            Some(page) => page,
            None => break,
        };
        writeln!(
            out,
            "\nPage {}/{}  ({}% answered)",
            page + 1,
            session.machine().page_count(),
            session.machine().progress_percent()
        )?;

        let mut went_back = false;
        let mut items = session.machine().current_page_items().into_iter();
        let mut pending = items.next();
        while let Some(item) = pending.clone() {
            let text = instrument.schema().text(&item).unwrap_or(item.as_str());
            match session.answers().get(&item) {
                Some(v) => write!(out, "{item}. {text} [{v}] > ")?,
                None => write!(out, "{item}. {text} > ")?,
            }
            out.flush()?;

            let Some(line) = read_line(input)? else {
                writeln!(out, "\nAnswers saved.")?;
                return Ok(None);
            };
            match parse_input(&line) {
                Some(PromptInput::Answer(value)) => match session.set_answer(&item, value) {
                    Ok(()) => pending = items.next(),
                    Err(e) if e.is_user_correctable() => writeln!(out, "  {e}")?,
                    Err(e) => return Err(e.into()),
                },
                Some(PromptInput::Keep) => pending = items.next(),
                Some(PromptInput::Back) => match session.retreat() {
                    Ok(_) => {
                        went_back = true;
                        break;
                    }
                    Err(e) => writeln!(out, "  {e}")?,
                },
                Some(PromptInput::Quit) => {
                    writeln!(out, "Answers saved.")?;
                    return Ok(None);
                }
                None => writeln!(out, "  not a number")?,
            }
        }
        if went_back {
            continue;
        }

        if !session.machine().is_last_page() {
            if let Err(e) = session.advance() {
                writeln!(out, "  {e}")?;
            }
            continue;
        }

        loop {
            match session.finalize().await {
                Ok(result) => {
                    if let Some(scores) = session.machine().scores() {
                        writeln!(out, "\n{}", scores.summary(instrument_id))?;
                    }
                    writeln!(
                        out,
                        "Risk: {} ({}%)  Wellbeing: {}/100",
                        result.category.label(),
                        result.percent(),
                        result.wellbeing_index()
                    )?;
                    return Ok(Some(result));
                }
                Err(e) if e.is_user_correctable() => {
                    writeln!(out, "  {e}")?;
                    break;
                }
                Err(e) => {
                    writeln!(out, "  could not save: {e}")?;
                    if !matches!(session.state(), SessionState::Failed { .. }) {
                        return Err(e.into());
                    }
                    write!(out, "Retry? [y/N] > ")?;
                    out.flush()?;
                    let retry = read_line(input)?
                        .map(|l| l.trim().eq_ignore_ascii_case("y"))
                        .unwrap_or(false);
                    if !retry {
                        return Err(e.into());
                    }
                }
            }
        }
    }

    Ok(session.machine().result())
}

/// `Collaborators` over the local data directory.
pub fn local_collaborators(
    data: &crate::config::MindtrackConfig,
    user_id: Option<String>,
    classifier: Arc<Classifier>,
) -> Collaborators {
    use mindtrack_storage::identity::WatchIdentity;
    use mindtrack_storage::local::{LocalCache, LocalStore};

    let identity = match user_id {
        Some(user) => WatchIdentity::signed_in(user),
        None => WatchIdentity::anonymous(),
    };
    Collaborators {
        store: Arc::new(LocalStore::new(data.store_dir())),
        cache: Arc::new(LocalCache::new(data.cache_dir())),
        identity: Arc::new(identity),
        classifier,
    }
}
