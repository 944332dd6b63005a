use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Comandos disponíveis:")]
pub enum Command {
    #[command(description = "abre o painel principal")]
    Start,
    #[command(description = "mostra esta mensagem de ajuda")]
    Help,
}
