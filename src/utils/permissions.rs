use serenity::all::Permissions;

use crate::services::gateway::ChatPermissions;

/// Discord permissions behind each content flag group of a bundle.
///
/// Several bundle flags share one Discord permission, which is denied as soon
/// as any flag mapped onto it is withheld. Info changes, pinning and invites are
/// left to the roles: a bundle never grants them and never takes them away.
fn content_groups(bundle: &ChatPermissions) -> [(bool, Permissions); 5] {
    [
        (
            bundle.can_send_messages,
            Permissions::SEND_MESSAGES | Permissions::SEND_MESSAGES_IN_THREADS,
        ),
        (
            bundle.can_send_audios
                && bundle.can_send_documents
                && bundle.can_send_photos
                && bundle.can_send_videos
                && bundle.can_send_video_notes,
            Permissions::ATTACH_FILES,
        ),
        (bundle.can_send_voice_notes, Permissions::SEND_VOICE_MESSAGES),
        (
            bundle.can_send_polls && bundle.can_send_other_messages,
            Permissions::ADD_REACTIONS
                | Permissions::USE_EXTERNAL_EMOJIS
                | Permissions::USE_EXTERNAL_STICKERS
                | Permissions::CREATE_PUBLIC_THREADS,
        ),
        (bundle.can_add_web_page_previews, Permissions::EMBED_LINKS),
    ]
}

/// Every Discord permission a bundle can deny
pub fn managed_bits() -> Permissions {
    content_groups(&ChatPermissions::restricted())
        .into_iter()
        .fold(Permissions::empty(), |acc, (_, bits)| acc | bits)
}

/// Permissions a bundle withholds. Granted flags stay neutral so the roles decide.
pub fn denied_bits(bundle: &ChatPermissions) -> Permissions {
    content_groups(bundle)
        .into_iter()
        .filter(|(granted, _)| !granted)
        .fold(Permissions::empty(), |acc, (_, bits)| acc | bits)
}

/// New `(allow, deny)` for a chat-wide overwrite.
///
/// Bits outside the managed content set are carried over from `existing`, so a
/// private channel stays private. Managed bits are reset to neutral and then
/// denied as the bundle requires.
pub fn merge_chat_overwrite(
    existing: Option<(Permissions, Permissions)>,
    bundle: &ChatPermissions,
) -> (Permissions, Permissions) {
    let managed = managed_bits();
    let (allow, deny) = existing.unwrap_or((Permissions::empty(), Permissions::empty()));

    (
        allow.difference(managed),
        deny.difference(managed) | denied_bits(bundle),
    )
}

/// What the bot needs in a chat it locks: posting notices and removing messages
pub fn bot_channel_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL
        | Permissions::SEND_MESSAGES
        | Permissions::EMBED_LINKS
        | Permissions::MANAGE_MESSAGES
}

/// Check a user against the fixed administrator allow-list
pub fn is_admin(admins: &[u64], user_id: u64) -> bool {
    admins.contains(&user_id)
}
