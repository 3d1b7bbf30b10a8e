//! Support tickets.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::aggregates::{NewTicket, Ticket, TicketStatus},
    error::{Result, StoreError},
    store::TicketStore,
};

#[derive(Clone)]
pub struct SupportDesk {
    tickets: Arc<dyn TicketStore>,
}

impl SupportDesk {
    pub fn new(tickets: Arc<dyn TicketStore>) -> Self {
        Self { tickets }
    }

    pub async fn open(&self, user: Uuid, new: NewTicket) -> Result<Ticket> {
        let new = new.trimmed();
        new.validate()?;
        let ticket = Ticket::open(user, new);
        self.tickets.insert_ticket(&ticket).await?;
        info!(%user, ticket_id = %ticket.id, "ticket opened");
        Ok(ticket)
    }

    pub async fn for_user(&self, user: Uuid) -> Result<Vec<Ticket>> {
        self.tickets.list_tickets(user).await
    }

    pub async fn set_status(&self, id: Uuid, status: TicketStatus) -> Result<()> {
        if !self.tickets.update_ticket_status(id, status).await? {
            return Err(StoreError::TicketNotFound);
        }
        info!(ticket_id = %id, %status, "ticket status updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.tickets.delete_ticket(id).await? {
            return Err(StoreError::TicketNotFound);
        }
        info!(ticket_id = %id, "ticket deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn ticket_lifecycle() -> TestResult {
        let desk = SupportDesk::new(Arc::new(MemoryStore::new()));
        let user = Uuid::now_v7();

        let ticket = desk
            .open(user, NewTicket { subject: "  Late delivery ".into(), message: "Where is my book?".into() })
            .await?;
        assert_eq!(ticket.subject, "Late delivery");
        assert_eq!(ticket.status, TicketStatus::Open);

        desk.set_status(ticket.id, TicketStatus::Closed).await?;
        assert_eq!(desk.for_user(user).await?[0].status, TicketStatus::Closed);

        desk.delete(ticket.id).await?;
        assert!(desk.for_user(user).await?.is_empty());
        assert!(matches!(desk.delete(ticket.id).await, Err(StoreError::TicketNotFound)));
        Ok(())
    }

    #[tokio::test]
    async fn blank_ticket_is_rejected() {
        let desk = SupportDesk::new(Arc::new(MemoryStore::new()));
        let result = desk.open(Uuid::now_v7(), NewTicket { subject: "Hi".into(), message: "  ".into() }).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }
}
