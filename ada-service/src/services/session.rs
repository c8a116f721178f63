//! AI-DM session state: the conversation log, turn counter and checkpoint.

use super::keys;
use super::narrator::{NarrationRequest, Narrator, NarratorError};
use super::repository::Repository;
use crate::models::{Campaign, CampaignMode, Dialogue, DialogueRole, Script};
use metrics::counter;
use service_core::error::AppError;
use std::sync::Arc;

pub const DM_SPEAKER: &str = "DM";

/// The last `size` ids of a log, oldest first.
pub fn window(ids: &[String], size: usize) -> &[String] {
    &ids[ids.len().saturating_sub(size)..]
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: u64,
    pub narration: String,
    pub player: Dialogue,
    pub dm: Dialogue,
}

#[derive(Debug, Clone)]
pub struct HistoryView {
    pub turn: u64,
    pub checkpoint: usize,
    pub total: usize,
    pub entries: Vec<Dialogue>,
}

impl From<NarratorError> for AppError {
    fn from(err: NarratorError) -> Self {
        match err {
            NarratorError::InvalidRequest(msg) => AppError::bad_request(msg),
            NarratorError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Narrator unavailable");
                AppError::ServiceUnavailable
            }
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    repo: Repository,
    narrator: Arc<dyn Narrator>,
    history_window: usize,
}

impl SessionService {
    pub fn new(repo: Repository, narrator: Arc<dyn Narrator>, history_window: usize) -> Self {
        Self {
            repo,
            narrator,
            history_window: history_window.max(1),
        }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Stores `entry` and appends it to its campaign's log.
    pub async fn append(&self, entry: &Dialogue) -> Result<usize, AppError> {
        self.repo.save(&keys::dialogue(&entry.id), entry).await?;
        self.repo
            .index_push(&keys::dialogue_by_campaign(&entry.campaign_id), &entry.id)
            .await
    }

    /// Most recent `limit` log entries, oldest first.
    pub async fn history(&self, campaign: &Campaign, limit: usize) -> Result<HistoryView, AppError> {
        let ids = self
            .repo
            .index(&keys::dialogue_by_campaign(&campaign.id))
            .await?;
        let entries = self
            .repo
            .load_many(window(&ids, limit), keys::dialogue)
            .await?;
        Ok(HistoryView {
            turn: campaign.ai_dm.turn,
            checkpoint: campaign.ai_dm.checkpoint,
            total: ids.len(),
            entries,
        })
    }

    /// Plays one turn: the player's action and the narrator's reply are
    /// appended to the log, then the campaign's turn counter advances.
    ///
    /// Writes are sequential. A narrator failure leaves the player entry in
    /// the log without a reply and the turn counter unchanged.
    pub async fn take_turn(
        &self,
        campaign: &mut Campaign,
        actor: String,
        character_id: Option<String>,
        action: String,
    ) -> Result<TurnOutcome, AppError> {
        if campaign.mode != CampaignMode::AiDm {
            return Err(AppError::bad_request("Campaign is not in AI-DM mode"));
        }

        let ids = self
            .repo
            .index(&keys::dialogue_by_campaign(&campaign.id))
            .await?;
        let history: Vec<Dialogue> = self
            .repo
            .load_many(window(&ids, self.history_window), keys::dialogue)
            .await?;

        let script_title = match &campaign.script_id {
            Some(script_id) => self
                .repo
                .load::<Script>(&keys::script(script_id))
                .await?
                .map(|script| script.title),
            None => None,
        };

        let turn = campaign.ai_dm.turn + 1;

        let player = Dialogue::new(
            &campaign.id,
            DialogueRole::Player,
            actor.clone(),
            character_id,
            action.clone(),
            turn,
        );
        self.append(&player).await?;

        let request = NarrationRequest {
            campaign_name: campaign.name.clone(),
            script_title,
            actor,
            action,
            turn,
            history,
        };
        let narration = self.narrator.narrate(&request).await?;

        let dm = Dialogue::new(
            &campaign.id,
            DialogueRole::Dm,
            DM_SPEAKER.to_string(),
            None,
            narration.clone(),
            turn,
        );
        self.append(&dm).await?;

        campaign.ai_dm.turn = turn;
        campaign.touch();
        self.repo.save(&keys::campaign(&campaign.id), campaign).await?;

        counter!("ada_ai_dm_turns_total").increment(1);
        tracing::info!(campaign_id = %campaign.id, turn, "AI-DM turn played");

        Ok(TurnOutcome {
            turn,
            narration,
            player,
            dm,
        })
    }

    /// Marks the current end of the log as the rewind point.
    pub async fn checkpoint(&self, campaign: &mut Campaign) -> Result<(), AppError> {
        let ids = self
            .repo
            .index(&keys::dialogue_by_campaign(&campaign.id))
            .await?;
        campaign.ai_dm.checkpoint = ids.len();
        campaign.ai_dm.checkpoint_turn = campaign.ai_dm.turn;
        campaign.touch();
        self.repo.save(&keys::campaign(&campaign.id), campaign).await?;

        tracing::info!(
            campaign_id = %campaign.id,
            checkpoint = ids.len(),
            turn = campaign.ai_dm.turn,
            "Checkpoint saved"
        );
        Ok(())
    }

    /// Drops every log entry after the checkpoint and restores its turn.
    /// Returns how many entries were removed.
    pub async fn rewind(&self, campaign: &mut Campaign) -> Result<usize, AppError> {
        let dropped = self
            .repo
            .index_truncate(
                &keys::dialogue_by_campaign(&campaign.id),
                campaign.ai_dm.checkpoint,
            )
            .await?;
        for id in &dropped {
            self.repo.remove(&keys::dialogue(id)).await?;
        }

        campaign.ai_dm.turn = campaign.ai_dm.checkpoint_turn;
        campaign.touch();
        self.repo.save(&keys::campaign(&campaign.id), campaign).await?;

        tracing::info!(
            campaign_id = %campaign.id,
            removed = dropped.len(),
            turn = campaign.ai_dm.turn,
            "Rewound to checkpoint"
        );
        Ok(dropped.len())
    }

    /// Removes a campaign's whole log.
    pub async fn clear(&self, campaign_id: &str) -> Result<(), AppError> {
        let dropped = self
            .repo
            .index_truncate(&keys::dialogue_by_campaign(campaign_id), 0)
            .await?;
        for id in &dropped {
            self.repo.remove(&keys::dialogue(id)).await?;
        }
        self.repo.remove(&keys::dialogue_by_campaign(campaign_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::narrator::LocalNarrator;
    use crate::services::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the history each turn was given.
    #[derive(Default)]
    struct RecordingNarrator {
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Narrator for RecordingNarrator {
        async fn narrate(&self, request: &NarrationRequest) -> Result<String, NarratorError> {
            self.seen.lock().unwrap().push(request.history.len());
            Ok(format!("turn {}", request.turn))
        }
    }

    fn ai_campaign() -> Campaign {
        Campaign::new("ada", "Lost Mine".to_string(), None, CampaignMode::AiDm)
    }

    #[test]
    fn window_keeps_the_tail() {
        let ids: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        assert_eq!(window(&ids, 2), ["3", "4"]);
        assert_eq!(window(&ids, 10).len(), 5);
        assert!(window(&ids, 0).is_empty());
    }

    #[tokio::test]
    async fn turns_advance_and_history_is_bounded() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let narrator = Arc::new(RecordingNarrator::default());
        let service = SessionService::new(repo, narrator.clone(), 3);
        let mut campaign = ai_campaign();

        for i in 0..4 {
            let outcome = service
                .take_turn(&mut campaign, "ada".to_string(), None, format!("action {}", i))
                .await
                .unwrap();
            assert_eq!(outcome.turn, i + 1);
            assert_eq!(outcome.dm.content, format!("turn {}", i + 1));
        }

        // Log grows by two per turn; the narrator never sees more than 3
        assert_eq!(*narrator.seen.lock().unwrap(), vec![0, 2, 3, 3]);
        let view = service.history(&campaign, 100).await.unwrap();
        assert_eq!(view.total, 8);
        assert_eq!(view.turn, 4);
    }

    #[tokio::test]
    async fn rewind_restores_checkpoint() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let service = SessionService::new(repo.clone(), Arc::new(LocalNarrator::new()), 12);
        let mut campaign = ai_campaign();

        service
            .take_turn(&mut campaign, "ada".to_string(), None, "look around".to_string())
            .await
            .unwrap();
        service.checkpoint(&mut campaign).await.unwrap();
        assert_eq!(campaign.ai_dm.checkpoint, 2);
        assert_eq!(campaign.ai_dm.checkpoint_turn, 1);

        for action in ["open the door", "attack the ogre"] {
            service
                .take_turn(&mut campaign, "ada".to_string(), None, action.to_string())
                .await
                .unwrap();
        }
        let before = service.history(&campaign, 100).await.unwrap();
        assert_eq!(before.total, 6);

        let removed = service.rewind(&mut campaign).await.unwrap();
        assert_eq!(removed, 4);
        assert_eq!(campaign.ai_dm.turn, 1);

        let after = service.history(&campaign, 100).await.unwrap();
        assert_eq!(after.total, 2);
        assert_eq!(after.entries[0].content, "look around");

        // Dropped records are gone, not just unindexed
        let dropped_id = &before.entries[2].id;
        assert!(repo
            .load::<Dialogue>(&keys::dialogue(dropped_id))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn human_campaigns_reject_turns() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let service = SessionService::new(repo, Arc::new(LocalNarrator::new()), 12);
        let mut campaign = Campaign::new("ada", "Table".to_string(), None, CampaignMode::Human);

        let result = service
            .take_turn(&mut campaign, "ada".to_string(), None, "look".to_string())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
