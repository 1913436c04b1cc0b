//! Built-in template text used until a clinic overrides it

use super::types::{Channel, MessageType};

/// Default text for a (channel, message type) pair. Never empty.
pub fn default_template(channel: Channel, message_type: MessageType) -> &'static str {
    match (channel, message_type) {
        (Channel::Whatsapp, MessageType::Reminder) => {
            "Olá, {patientName}! Lembramos que sua consulta de {procedure} com {professional} \
             está marcada para {date} às {time}. Responda SIM para confirmar. {clinicName}"
        }
        (Channel::Whatsapp, MessageType::WinBack) => {
            "Olá, {patientName}! Sentimos sua falta. Sua última visita foi em {lastVisit}. \
             Que tal agendar uma avaliação? {clinicName}"
        }
        (Channel::Whatsapp, MessageType::OpenSlot) => {
            "Olá, {patientName}! Abriu um horário para {procedure} em {date} às {time}. \
             Tem interesse? Responda para reservar. {clinicName}"
        }
        (Channel::Sms, MessageType::Reminder) => {
            "{clinicName}: {patientName}, consulta em {date} às {time}. Responda SIM para confirmar."
        }
        (Channel::Sms, MessageType::WinBack) => {
            "{clinicName}: {patientName}, faz tempo desde {lastVisit}. Agende sua revisão."
        }
        (Channel::Sms, MessageType::OpenSlot) => {
            "{clinicName}: {patientName}, vaga para {procedure} em {date} às {time}. Responda para reservar."
        }
        (Channel::Email, MessageType::Reminder) => {
            "Prezado(a) {patientName},\n\nEste é um lembrete da sua consulta de {procedure} \
             com {professional} no dia {date} às {time}.\n\nAtenciosamente,\n{clinicName}"
        }
        (Channel::Email, MessageType::WinBack) => {
            "Prezado(a) {patientName},\n\nNotamos que sua última visita foi em {lastVisit}. \
             Manter as revisões em dia é importante para sua saúde bucal. \
             Entre em contato para agendar.\n\nAtenciosamente,\n{clinicName}"
        }
        (Channel::Email, MessageType::OpenSlot) => {
            "Prezado(a) {patientName},\n\nSurgiu uma vaga para {procedure} no dia {date} \
             às {time}. Responda este e-mail para garantir o horário.\n\nAtenciosamente,\n{clinicName}"
        }
    }
}
