use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    Message, ResultEngine, messages,
    users::Role,
};

use super::{Engine, access::ensure_admin, normalize_required, with_tx};

impl Engine {
    /// Sends an in-app message to a user (admin side).
    pub async fn send_message(
        &self,
        actor: Role,
        user_id: &str,
        text: &str,
    ) -> ResultEngine<Message> {
        ensure_admin(actor)?;
        let text = normalize_required(text, "message text")?;

        with_tx!(self, |db_tx| {
            let user = self.require_visible_user(&db_tx, actor, user_id).await?;
            let message = Message::new(user.id, text);
            messages::ActiveModel::from(&message).insert(&db_tx).await?;
            Ok(message)
        })
    }

    /// Lists a user's messages, newest first.
    ///
    /// With `mark_read` the unread ones are flipped in the same call — the
    /// original dashboard marks on open, and the unread badge reads the
    /// count separately.
    pub async fn list_messages(&self, user_id: &str, mark_read: bool) -> ResultEngine<Vec<Message>> {
        let models = messages::Entity::find()
            .filter(messages::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(messages::Column::CreatedAt)
            .all(&self.database)
            .await?;

        if mark_read {
            messages::Entity::update_many()
                .col_expr(messages::Column::IsRead, Expr::value(true))
                .filter(messages::Column::UserId.eq(user_id.to_string()))
                .filter(messages::Column::IsRead.eq(false))
                .exec(&self.database)
                .await?;
        }

        models.into_iter().map(Message::try_from).collect()
    }

    /// Number of unread messages (the notification badge).
    pub async fn unread_message_count(&self, user_id: &str) -> ResultEngine<u64> {
        let count = messages::Entity::find()
            .filter(messages::Column::UserId.eq(user_id.to_string()))
            .filter(messages::Column::IsRead.eq(false))
            .count(&self.database)
            .await?;
        Ok(count)
    }
}
