//! Choosing the category a topic is filed under.

use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::sync::Mutex;
use vaultpost_client::ForumClient;
use vaultpost_core::prelude::*;

/// Picks one category id out of the forum's list, or none.
#[async_trait]
pub trait CategorySelector: Send + Sync {
    async fn select(&self, categories: &[Category]) -> Option<u64>;
}

/// Always picks the same id, provided the forum offers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCategory(pub u64);

#[async_trait]
impl CategorySelector for FixedCategory {
    async fn select(&self, categories: &[Category]) -> Option<u64> {
        let found = categories.iter().any(|c| c.id == self.0);
        if !found {
            log::warn!("Category {} is not offered by the forum", self.0);
        }
        found.then_some(self.0)
    }
}

/// Numbered menu on a writer, answer read from a line of input.
///
/// An empty line picks the first category.
pub struct PromptSelector<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> PromptSelector<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }

    fn prompt(&self, categories: &[Category]) -> std::io::Result<Option<u64>> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| std::io::Error::other("prompt lock poisoned"))?;
        let (input, output) = &mut *guard;

        for (i, category) in categories.iter().enumerate() {
            writeln!(output, "{:>3}) {} [{}]", i + 1, category.name, category.id)?;
        }
        write!(output, "Category [1-{}]: ", categories.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(categories.first().map(|c| c.id));
        }

        Ok(answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| categories.get(i))
            .map(|c| c.id))
    }
}

#[async_trait]
impl<R, W> CategorySelector for PromptSelector<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    async fn select(&self, categories: &[Category]) -> Option<u64> {
        match self.prompt(categories) {
            Ok(choice) => choice,
            Err(e) => {
                log::warn!("Category prompt failed: {}", e);
                None
            }
        }
    }
}

/// Fetch the forum's categories and let `selector` pick one.
pub async fn choose_category(client: &ForumClient, selector: &dyn CategorySelector) -> Result<u64> {
    let categories = client.fetch_categories().await?;
    if categories.is_empty() {
        return Err(Error::config_error("The forum returned no categories"));
    }

    selector
        .select(&categories)
        .await
        .ok_or_else(|| Error::config_error("No category selected"))
}
