//! Événements du lecteur et système d'abonnements
//!
//! Ce module fournit une infrastructure d'abonnement type-safe permettant
//! au scheduler de publier ses événements (compte à rebours, démarrages,
//! éléments sautés) sans jamais dépendre de la vitesse des abonnés.

use std::time::Duration;
use tokio::sync::mpsc;

/// Trait de base pour tous les événements du lecteur
pub trait PlayerEvent: Send + Sync + Clone + 'static {}

/// Événement : tick du compte à rebours de l'élément affiché
///
/// Émission purement cosmétique : perdre ou dupliquer un tick n'affecte
/// jamais l'avancement, piloté par le timer de durée.
#[derive(Debug, Clone)]
pub struct CountdownTick {
    /// Index de l'élément dans la playlist
    pub index: usize,
    /// Temps restant d'affichage
    pub remaining: Duration,
    /// Représentation `mm:ss` prête à afficher
    pub display: String,
}

impl PlayerEvent for CountdownTick {}

/// Événement : un élément vient de démarrer son affichage
#[derive(Debug, Clone)]
pub struct ItemStarted {
    /// Index de l'élément dans la playlist
    pub index: usize,
    /// URI source de l'élément
    pub uri: String,
    /// Durée effective retenue (min entre demandée et intrinsèque)
    pub duration: Duration,
}

impl PlayerEvent for ItemStarted {}

/// Événement : un élément a été sauté après un échec
#[derive(Debug, Clone)]
pub struct ItemSkipped {
    /// Index de l'élément dans la playlist
    pub index: usize,
    /// URI source de l'élément
    pub uri: String,
    /// Cause de l'échec
    pub reason: String,
}

impl PlayerEvent for ItemSkipped {}

/// Gestionnaire d'abonnements pour un type d'événement spécifique
///
/// Permet d'enregistrer des abonnés et de leur publier des événements.
pub struct EventPublisher<E: PlayerEvent> {
    subscribers: Vec<mpsc::Sender<E>>,
}

impl<E: PlayerEvent> EventPublisher<E> {
    /// Crée un nouveau publisher vide
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Ajoute un abonné via un channel
    pub fn subscribe(&mut self, tx: mpsc::Sender<E>) {
        self.subscribers.push(tx);
    }

    /// Publie un événement à tous les abonnés
    ///
    /// Utilise try_send : un abonné lent ou disparu ne bloque jamais la
    /// boucle de lecture.
    pub async fn publish(&self, event: E) {
        for tx in &self.subscribers {
            let _ = tx.try_send(event.clone());
        }
    }
}

impl<E: PlayerEvent> Default for EventPublisher<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_publisher_basic() {
        let mut publisher = EventPublisher::<CountdownTick>::new();
        let (tx, mut rx) = mpsc::channel(10);

        publisher.subscribe(tx);

        let event = CountdownTick {
            index: 2,
            remaining: Duration::from_secs(13),
            display: "00:13".to_string(),
        };

        publisher.publish(event.clone()).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.index, 2);
        assert_eq!(received.display, "00:13");
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let mut publisher = EventPublisher::<ItemSkipped>::new();
        let (tx1, mut rx1) = mpsc::channel(10);
        let (tx2, mut rx2) = mpsc::channel(10);

        publisher.subscribe(tx1);
        publisher.subscribe(tx2);

        let event = ItemSkipped {
            index: 0,
            uri: "https://example.com/broken.jpg".to_string(),
            reason: "fetch failed".to_string(),
        };

        publisher.publish(event.clone()).await;

        assert_eq!(rx1.recv().await.unwrap().index, 0);
        assert_eq!(rx2.recv().await.unwrap().index, 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_never_blocks() {
        let mut publisher = EventPublisher::<CountdownTick>::new();
        // Channel plein dès le premier événement
        let (tx, _rx) = mpsc::channel(1);
        publisher.subscribe(tx);

        for i in 0..10 {
            publisher
                .publish(CountdownTick {
                    index: i,
                    remaining: Duration::ZERO,
                    display: "00:00".to_string(),
                })
                .await;
        }
        // Arrivé ici sans blocage : les ticks excédentaires sont perdus
    }
}
