//! 未読数の計算

use std::collections::BTreeMap;

use super::{entity::Conversation, value_object::UserId};

/// 会話相手ごとの未読メッセージ数
pub type UnseenCounts = BTreeMap<UserId, usize>;

/// `user_id` が参加している全会話について、会話相手ごとの未読数を計算する
///
/// 未読数 0 の会話相手も含める。
/// `user_id` が参加していない会話は無視する。
pub fn unseen_counts<'a>(
    user_id: &UserId,
    conversations: impl IntoIterator<Item = &'a Conversation>,
) -> UnseenCounts {
    conversations
        .into_iter()
        .filter_map(|conversation| {
            let counterpart = conversation.key.counterpart_of(user_id)?;
            Some((
                counterpart.clone(),
                conversation.unseen_count_for(user_id),
            ))
        })
        .collect()
}
